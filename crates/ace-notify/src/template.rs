//! Mail composition from KPI defaults and selected alerts.

use chrono::{DateTime, Utc};

/// A composed mail ready for a [`crate::NotificationChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// KPI-level defaults the composition starts from.
#[derive(Debug, Clone, Default)]
pub struct MailDefaults {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub footer: String,
}

/// Per-send overrides; `None` keeps the KPI default.
#[derive(Debug, Clone, Default)]
pub struct MailOverrides {
    pub to: Option<Vec<String>>,
    pub cc: Option<Vec<String>>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

/// One alert line rendered into the mail body.
#[derive(Debug, Clone)]
pub struct AlertLine {
    pub alert_date: DateTime<Utc>,
    pub detail: String,
    pub severity: Option<String>,
    pub comment: Option<String>,
}

/// Renders subject and body text before composition.
///
/// Templating is not wired up yet: KPI defaults may contain
/// `{KPI_NAME}`-style placeholders, and until a real engine is plugged
/// in here they pass through to the mail verbatim.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str) -> String;
}

/// The default renderer: returns the template text unchanged.
pub struct PassthroughRenderer;

impl TemplateRenderer for PassthroughRenderer {
    fn render(&self, template: &str) -> String {
        template.to_string()
    }
}

/// Composes a mail from KPI defaults, the selected alerts and optional
/// per-send overrides.
///
/// The body is the (rendered) default or override body, a plain-text
/// table of the alerts, then the footer. No HTML is produced.
pub fn compose_mail(
    renderer: &dyn TemplateRenderer,
    defaults: &MailDefaults,
    alerts: &[AlertLine],
    overrides: &MailOverrides,
) -> OutgoingMail {
    let subject = renderer.render(
        overrides
            .subject
            .as_deref()
            .unwrap_or(defaults.subject.as_str()),
    );
    let intro = renderer.render(overrides.body.as_deref().unwrap_or(defaults.body.as_str()));

    let mut body = String::new();
    if !intro.is_empty() {
        body.push_str(&intro);
        body.push_str("\n\n");
    }
    body.push_str(&render_alert_table(alerts));
    if !defaults.footer.is_empty() {
        body.push_str("\n\n");
        body.push_str(&defaults.footer);
    }

    OutgoingMail {
        to: overrides.to.clone().unwrap_or_else(|| defaults.to.clone()),
        cc: overrides.cc.clone().unwrap_or_else(|| defaults.cc.clone()),
        subject,
        body,
    }
}

fn render_alert_table(alerts: &[AlertLine]) -> String {
    let mut out = String::from("Date       | Severity | Detail");
    for alert in alerts {
        out.push('\n');
        out.push_str(&format!(
            "{} | {:<8} | {}",
            alert.alert_date.format("%Y-%m-%d"),
            alert.severity.as_deref().unwrap_or("-"),
            alert.detail,
        ));
        if let Some(ref comment) = alert.comment {
            out.push_str(&format!("\n           |          |   note: {comment}"));
        }
    }
    out
}

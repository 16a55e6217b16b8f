use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::summarizer::{SummaryInput, SummaryResult, Summarizer};

/// Simulated latency of a real model call.
const MOCK_DELAY: Duration = Duration::from_secs(2);

/// Canned-report summarizer.
///
/// Waits a fixed two seconds and returns a deterministic markdown report
/// built from the selected alerts. Stands in for a real provider until
/// one is integrated behind the [`Summarizer`] trait.
#[derive(Default)]
pub struct MockSummarizer;

impl MockSummarizer {
    pub fn new() -> Self {
        Self
    }

    fn render(input: &SummaryInput) -> String {
        let mut out = String::from("## Alert Summary Report\n\n### Overview\n\n");
        out.push_str(&format!(
            "{} alert(s) were selected for this report.\n",
            input.alerts.len()
        ));
        if let Some(ref prompt) = input.prompt {
            out.push_str(&format!("\nOperator focus: {prompt}\n"));
        }

        out.push_str("\n### Alert Details\n\n");
        for alert in &input.alerts {
            out.push_str(&format!(
                "- **{}** [{}] {} ({})\n",
                alert.kpi_name,
                alert.severity.as_deref().unwrap_or("unrated"),
                alert.detail,
                alert.alert_date.format("%Y-%m-%d"),
            ));
            if let Some(ref comment) = alert.comment {
                out.push_str(&format!("  - Curation note: {comment}\n"));
            }
        }

        out.push_str(
            "\n### Key Findings\n\n\
             - The selected alerts cluster around recurring threshold breaches.\n\
             - Curated entries carry reviewer context; uncurated entries may need triage.\n\
             \n### Recommended Actions\n\n\
             - Review each breach against the KPI's expected operating range.\n\
             - Notify the owning department where no curation note exists yet.\n\
             - Consider tightening alert thresholds for KPIs that fire repeatedly.\n",
        );
        out
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    fn provider(&self) -> &str {
        "mock"
    }

    async fn summarize(&self, input: SummaryInput) -> Result<SummaryResult> {
        // 固定延迟模拟真实模型调用
        tokio::time::sleep(MOCK_DELAY).await;
        Ok(SummaryResult {
            content: Self::render(&input),
        })
    }
}

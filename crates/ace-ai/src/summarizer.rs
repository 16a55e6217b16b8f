use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 摘要输入
#[derive(Debug, Clone, Serialize)]
pub struct SummaryInput {
    /// 选中的告警
    pub alerts: Vec<AlertDigestLine>,
    /// 调用方附加的提示词（可选）
    pub prompt: Option<String>,
}

/// 单条告警摘要行
#[derive(Debug, Clone, Serialize)]
pub struct AlertDigestLine {
    pub alert_date: DateTime<Utc>,
    pub kpi_name: String,
    pub detail: String,
    pub severity: Option<String>,
    pub comment: Option<String>,
}

/// 摘要结果
#[derive(Debug, Clone)]
pub struct SummaryResult {
    /// Markdown 格式报告
    pub content: String,
}

/// 告警摘要器 trait（为接入真实模型预留的扩展点）
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// 模型提供商名称
    fn provider(&self) -> &str;

    /// 汇总选中的告警，生成 Markdown 报告
    async fn summarize(&self, input: SummaryInput) -> Result<SummaryResult>;
}

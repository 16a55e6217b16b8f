pub mod providers;
pub mod summarizer;

pub use providers::mock::MockSummarizer;
pub use summarizer::{AlertDigestLine, SummaryInput, SummaryResult, Summarizer};

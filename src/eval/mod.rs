pub mod judgments;
pub mod metrics;
pub mod report;

pub use judgments::RelevanceJudgment;
pub use metrics::{MetricsEngine, PrPoint, RetrievalMetrics};
pub use report::EvaluationReport;

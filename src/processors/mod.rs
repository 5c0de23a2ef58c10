pub mod correction;
pub mod data_merger;
pub mod merge_pipeline;

pub use correction::{append_corrected_column, correct_pm25, correct_pm25_value, corrected_pm25};
pub use data_merger::{DailySummary, DataMerger};
pub use merge_pipeline::{MergePipeline, MergeSummary};

pub mod orchestrator;
pub mod report;

pub use orchestrator::{BuildOptions, PlaylistBuilder, UPLOAD_BATCH_SIZE};
pub use report::BuildReport;

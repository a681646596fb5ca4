//! Bridge to the locally hosted model pipelines

mod daemon;
mod pipelines;
mod pool;

pub use daemon::{read_frame, write_frame, DaemonClient};
pub use pipelines::DaemonPipeline;
pub use pool::InferencePool;

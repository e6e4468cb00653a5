//! Queueing, chunking, retry and the playback worker

pub mod chunker;
pub mod pipeline;
pub mod queue;
pub mod retry;
pub mod worker;

pub use chunker::split_text;
pub use pipeline::{PlaybackOutcome, SpeechPipeline};
pub use queue::PlaybackQueue;
pub use retry::{Attempted, RetryPolicy};
pub use worker::{PlaybackWorker, WorkerState};

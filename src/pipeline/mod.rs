//! The chunked transcription pipeline.
//!
//! Planning splits a probed duration into bounded intervals, the dispatcher
//! runs them against providers under a concurrency cap, and the assembler
//! reorders settled results into one transcript. Short clips and windowed
//! requests skip all of that for a single direct provider call.

pub mod assembler;
pub mod dispatcher;
pub mod orchestrator;
pub mod planner;
pub mod window;

pub use assembler::{TranscriptOutput, TranscriptionMode, assemble};
pub use dispatcher::{ChunkResult, Dispatcher, TranscriptionJob};
pub use orchestrator::{TranscriptionPipeline, TranscriptionRequest, WindowRequest};
pub use planner::{ChunkPlan, ChunkSpec, TimeWindow, playback_window};

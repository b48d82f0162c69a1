// reelmatch: content-based movie recommendations from genre tags.
//
// This is the library root. Each module corresponds to a subsystem: the
// catalog and its feature index, the scoring functions, the rating store,
// and the pipeline that ties them together for the CLI and the web API.

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod status;

#[cfg(feature = "web")]
pub mod web;

pub use error::{EngineError, EngineResult};

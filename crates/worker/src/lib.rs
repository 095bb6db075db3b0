//! Background job runner for the generation pipeline.

pub mod runner;

pub use runner::{JobRunner, RunnerConfig};

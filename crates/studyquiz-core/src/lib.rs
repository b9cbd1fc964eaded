//! studyquiz-core: Quiz model, grading engine, and scoring.
//!
//! This crate defines the quiz data model, the per-question grading
//! heuristics, aggregate scoring, and the session/progress state that the
//! CLI and report crates build on.

pub mod answer;
pub mod config;
pub mod error;
pub mod grading;
pub mod model;
pub mod parser;
pub mod progress;
pub mod scoring;
pub mod session;

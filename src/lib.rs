//! Detects transactional email opportunities in design screens.
//!
//! A detection pass extracts screens from a document tree, classifies them
//! with local heuristics, optionally asks text and vision endpoints for their
//! read of each screen, fuses the signals per screen, and synthesizes a
//! cross-screen flow summary. See [`engine::engine::DetectionEngine`].

pub mod ai;
pub mod cli;
pub mod email;
pub mod engine;
pub mod fusion;
pub mod report;
pub mod screen;
pub mod trace;

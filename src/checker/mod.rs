// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - html: Extracts links from HTML documents
// - http: Probes a single URL (HEAD, then GET) and classifies the result
// - schedule: Runs the probes for a document through a bounded pool
//
// Data flows one way: html -> schedule -> http -> back to the caller as
// CheckedLink values.
// =============================================================================

mod html;
mod http;
mod schedule;

// Re-export public items so callers can write `checker::Prober`
// instead of `checker::http::Prober`
pub use html::{extract_html_links, Link};
pub use http::{LinkStatus, ProbeOutcome, Prober};
pub use schedule::{check_links, CheckedLink, ScheduleOptions};

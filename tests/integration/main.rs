//! Integration tests for scroll-scribe
//!
//! Pipeline tests drive the orchestrator with scripted collaborators; the
//! HTTP tests use wiremock to exercise the default fetcher end to end.

mod common;
mod discovery_tests;
mod pipeline_tests;

//! ELM327 diagnostic scanner.
//!
//! Library half of the `elm-diag` binary, exposed so integration tests can
//! drive a scan against a simulated adapter.

pub mod config;
pub mod scan;

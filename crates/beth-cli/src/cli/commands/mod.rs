//! CLI command handlers.

use beth_core::definitions::LoadError;

pub mod agents;
pub mod chat;
pub mod config;
pub mod route;
pub mod skills;

/// Prints per-file load errors to stderr.
fn report_load_errors(errors: &[LoadError]) {
    for error in errors {
        eprintln!("warning: {error}");
    }
}

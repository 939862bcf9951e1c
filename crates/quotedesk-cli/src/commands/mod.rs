//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Config and input loading, shared output helpers, `config` command
//! - `costing` - Product costing and import tax commands
//! - `responses` - Summary, grouping, listing and validation commands

pub mod core;
pub mod costing;
pub mod responses;

// Re-export command functions for main.rs
pub use core::*;
pub use costing::*;
pub use responses::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

//! Healthdash Tools module
//!
//! MCP tool implementations: record and goal management, dashboard views
//! and chart rendering.

pub mod charts;
pub mod dashboard;
pub mod goals;
pub mod records;
pub mod status;

//! Health Dashboard Library
//!
//! Daily health records, nutrition goals and goal-progress evaluation.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod progress;
pub mod storage;
pub mod tools;

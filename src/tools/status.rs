//! Healthdash Status Tool
//!
//! Provides runtime status information about the service.

use serde::Serialize;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::config::{AppConfig, StorageBackend};
use crate::storage::Stores;

/// Status response
#[derive(Debug, Serialize)]
pub struct HealthDashStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Storage information
    pub storage_backend: StorageBackend,
    pub database_path: Option<String>,
    pub database_size_bytes: Option<u64>,
    pub health_record_count: i64,
    pub goal_count: usize,
    pub active_goal_count: usize,

    /// Evaluation settings
    pub utc_offset_hours: i32,
    pub trajectory_window_days: u32,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    config: AppConfig,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(config: AppConfig) -> Self {
        Self {
            start_time: Instant::now(),
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the current status
    pub fn get_status(&self, stores: &Stores) -> Result<HealthDashStatus, String> {
        let build_info = BuildInfo::current();

        let (database_path, database_size_bytes) = match stores.backend {
            StorageBackend::Sqlite => (
                Some(self.config.database_path.display().to_string()),
                std::fs::metadata(&self.config.database_path).ok().map(|m| m.len()),
            ),
            StorageBackend::Memory => (None, None),
        };

        let health_record_count = stores
            .records
            .count()
            .map_err(|e| format!("Failed to count health records: {}", e))?;
        let goals = stores
            .goals
            .list_goals(false)
            .map_err(|e| format!("Failed to list goals: {}", e))?;

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        Ok(HealthDashStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            storage_backend: stores.backend,
            database_path,
            database_size_bytes,
            health_record_count,
            goal_count: goals.len(),
            active_goal_count: goals.iter().filter(|g| g.is_active).count(),
            utc_offset_hours: self.config.utc_offset_hours,
            trajectory_window_days: self.config.trajectory_window_days,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        })
    }
}

//! Healthdash MCP Server Implementation
//!
//! Exposes record, goal and dashboard tools over MCP.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::models::{GoalCreate, GoalUpdate, HealthRecordUpdate, SortOrder, ValidationError};
use crate::progress::dates::resolve_today_in;
use crate::storage::Stores;
use crate::tools::charts::{self, DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH};
use crate::tools::dashboard;
use crate::tools::goals;
use crate::tools::records::{self, parse_date_arg};
use crate::tools::status::StatusTracker;

/// Healthdash MCP Service
#[derive(Clone)]
pub struct HealthDashService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    stores: Stores,
    config: Arc<AppConfig>,
    tool_router: ToolRouter<HealthDashService>,
}

impl HealthDashService {
    pub fn new(config: AppConfig, stores: Stores) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(config.clone()))),
            stores,
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }

    fn window_days(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.config.trajectory_window_days).max(1)
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found(what: &str, key: impl std::fmt::Display) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(format!(
        r#"{{"error": "{} not found", "key": "{}"}}"#,
        what, key
    ))]))
}

fn no_active_goal() -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(
        r#"{"error": "No active goal. Create one with create_goal or activate one with update_goal."}"#,
    )]))
}

// ============================================================================
// Health Record Parameter Structs
// ============================================================================

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RecordHealthDataParams {
    /// Day of the measurements. Accepts YYYY-MM-DD, YYYY/MM/DD HH:MM or an ISO timestamp (default today)
    pub date: Option<String>,
    /// Body weight in kg
    pub weight: Option<f64>,
    /// Body fat percentage (0-100)
    pub body_fat_percentage: Option<f64>,
    /// Muscle mass in kg
    pub muscle_mass: Option<f64>,
    /// Step count (whole number)
    pub steps: Option<f64>,
    /// Active energy burned in kcal (whole number)
    pub active_calories: Option<f64>,
    /// Resting energy burned in kcal (whole number)
    pub resting_calories: Option<f64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub carbohydrate_g: Option<f64>,
    pub fiber_g: Option<f64>,
    pub sugar_g: Option<f64>,
    pub sodium_mg: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetHealthRecordParams {
    /// Date (YYYY-MM-DD)
    pub date: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListHealthRecordsParams {
    /// Maximum results (default 30, max 1000)
    #[serde(default = "default_record_limit")]
    pub limit: i64,
    /// Offset for pagination (default 0)
    #[serde(default)]
    pub offset: i64,
    /// Sort order by date: asc or desc (default desc)
    #[serde(default = "default_sort_order")]
    pub order: String,
}

fn default_record_limit() -> i64 { 30 }
fn default_sort_order() -> String { "desc".to_string() }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateHealthRecordParams {
    /// Health record ID
    pub id: i64,
    pub weight: Option<f64>,
    pub body_fat_percentage: Option<f64>,
    pub muscle_mass: Option<f64>,
    pub steps: Option<i64>,
    pub active_calories: Option<i64>,
    pub resting_calories: Option<i64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub carbohydrate_g: Option<f64>,
    pub fiber_g: Option<f64>,
    pub sugar_g: Option<f64>,
    pub sodium_mg: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteHealthRecordParams {
    /// Health record ID to delete
    pub id: i64,
}

// ============================================================================
// Goal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateGoalParams {
    /// Name of the goal
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Target body weight in kg
    pub target_weight_kg: Option<f64>,
    /// First day of the plan (YYYY-MM-DD)
    pub start_date: String,
    /// Last day of the plan (YYYY-MM-DD)
    pub end_date: String,
    /// Daily intake band in kcal
    pub daily_calorie_intake_min: Option<f64>,
    pub daily_calorie_intake_max: Option<f64>,
    /// Daily protein band in grams
    pub daily_protein_min_g: Option<f64>,
    pub daily_protein_max_g: Option<f64>,
    /// Daily fat band in grams
    pub daily_fat_min_g: Option<f64>,
    pub daily_fat_max_g: Option<f64>,
    /// Daily carbohydrate band in grams
    pub daily_carb_min_g: Option<f64>,
    pub daily_carb_max_g: Option<f64>,
    /// Daily step target
    pub daily_steps_target: Option<i64>,
    /// Whether the goal is evaluated on the dashboard (default true)
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool { true }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetGoalParams {
    /// Goal ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListGoalsParams {
    /// Only list active goals (default false)
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateGoalParams {
    /// Goal ID to update
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub target_weight_kg: Option<f64>,
    /// New start date (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// New end date (YYYY-MM-DD)
    pub end_date: Option<String>,
    pub daily_calorie_intake_min: Option<f64>,
    pub daily_calorie_intake_max: Option<f64>,
    pub daily_protein_min_g: Option<f64>,
    pub daily_protein_max_g: Option<f64>,
    pub daily_fat_min_g: Option<f64>,
    pub daily_fat_max_g: Option<f64>,
    pub daily_carb_min_g: Option<f64>,
    pub daily_carb_max_g: Option<f64>,
    pub daily_steps_target: Option<i64>,
    /// Activate or pause the goal
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteGoalParams {
    /// Goal ID to delete
    pub id: i64,
}

// ============================================================================
// Dashboard Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WindowParams {
    /// Number of days to show, ending today (default from configuration, usually 30)
    pub window_days: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateWeightChartParams {
    /// Number of days to show, ending today
    pub window_days: Option<u32>,
    /// Image width in pixels (default 900)
    #[serde(default = "default_chart_width")]
    pub width: u32,
    /// Image height in pixels (default 500)
    #[serde(default = "default_chart_height")]
    pub height: u32,
    /// Where to write the PNG (default: charts/ next to the database)
    pub output_path: Option<String>,
}

fn default_chart_width() -> u32 { DEFAULT_CHART_WIDTH }
fn default_chart_height() -> u32 { DEFAULT_CHART_HEIGHT }

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl HealthDashService {
    // --- Status ---

    #[tool(description = "Get the current status of the healthdash service including build info, storage backend, record counts and process information")]
    async fn healthdash_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.stores).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&status)
    }

    // --- Health Records ---

    #[tool(description = "Record a day of health data (body, activity, nutrition). Fields not sent keep their stored value when the day already exists. Missing date means today (UTC+9 by default).")]
    fn record_health_data(&self, Parameters(p): Parameters<RecordHealthDataParams>) -> Result<CallToolResult, McpError> {
        let payload = serde_json::to_value(&p).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        let today = resolve_today_in(Utc::now(), self.config.utc_offset());
        let result = records::record_health_data(&self.stores, payload, today).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get the health record for one date")]
    fn get_health_record(&self, Parameters(p): Parameters<GetHealthRecordParams>) -> Result<CallToolResult, McpError> {
        let result = records::get_health_record(&self.stores, &p.date).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(record) => json_result(&record),
            None => not_found("Health record", &p.date),
        }
    }

    #[tool(description = "List health records ordered by date with pagination")]
    fn list_health_records(&self, Parameters(p): Parameters<ListHealthRecordsParams>) -> Result<CallToolResult, McpError> {
        let order: SortOrder = p
            .order
            .parse()
            .map_err(|e: ValidationError| McpError::invalid_params(e.to_string(), None))?;
        let result = records::list_health_records(&self.stores, p.limit, p.offset, order)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update individual fields of a health record. Total calories are recomputed from active and resting calories.")]
    fn update_health_record(&self, Parameters(p): Parameters<UpdateHealthRecordParams>) -> Result<CallToolResult, McpError> {
        let data = HealthRecordUpdate {
            weight: p.weight, body_fat_percentage: p.body_fat_percentage, muscle_mass: p.muscle_mass,
            steps: p.steps, active_calories: p.active_calories, resting_calories: p.resting_calories,
            protein_g: p.protein_g, fat_g: p.fat_g, carbohydrate_g: p.carbohydrate_g,
            fiber_g: p.fiber_g, sugar_g: p.sugar_g, sodium_mg: p.sodium_mg,
        };
        let result = records::update_health_record(&self.stores, p.id, data).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a health record")]
    fn delete_health_record(&self, Parameters(p): Parameters<DeleteHealthRecordParams>) -> Result<CallToolResult, McpError> {
        let result = records::delete_health_record(&self.stores, p.id).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Goals ---

    #[tool(description = "Create a weight/nutrition goal with a plan period, daily intake bands and a step target")]
    fn create_goal(&self, Parameters(p): Parameters<CreateGoalParams>) -> Result<CallToolResult, McpError> {
        let start_date = parse_date_arg(&p.start_date).map_err(|e| McpError::invalid_params(e, None))?;
        let end_date = parse_date_arg(&p.end_date).map_err(|e| McpError::invalid_params(e, None))?;
        let data = GoalCreate {
            name: p.name, description: p.description, target_weight_kg: p.target_weight_kg,
            start_date, end_date,
            daily_calorie_intake_min: p.daily_calorie_intake_min, daily_calorie_intake_max: p.daily_calorie_intake_max,
            daily_protein_min_g: p.daily_protein_min_g, daily_protein_max_g: p.daily_protein_max_g,
            daily_fat_min_g: p.daily_fat_min_g, daily_fat_max_g: p.daily_fat_max_g,
            daily_carb_min_g: p.daily_carb_min_g, daily_carb_max_g: p.daily_carb_max_g,
            daily_steps_target: p.daily_steps_target, is_active: p.is_active,
        };
        let result = goals::create_goal(&self.stores, data).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a goal by ID")]
    fn get_goal(&self, Parameters(p): Parameters<GetGoalParams>) -> Result<CallToolResult, McpError> {
        let result = goals::get_goal(&self.stores, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(goal) => json_result(&goal),
            None => not_found("Goal", p.id),
        }
    }

    #[tool(description = "List goals, newest first")]
    fn list_goals(&self, Parameters(p): Parameters<ListGoalsParams>) -> Result<CallToolResult, McpError> {
        let result = goals::list_goals(&self.stores, p.active_only).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update a goal. Only provided fields change; the period and bands are re-validated.")]
    fn update_goal(&self, Parameters(p): Parameters<UpdateGoalParams>) -> Result<CallToolResult, McpError> {
        let start_date = p.start_date.as_deref().map(parse_date_arg).transpose()
            .map_err(|e| McpError::invalid_params(e, None))?;
        let end_date = p.end_date.as_deref().map(parse_date_arg).transpose()
            .map_err(|e| McpError::invalid_params(e, None))?;
        let data = GoalUpdate {
            name: p.name, description: p.description, target_weight_kg: p.target_weight_kg,
            start_date, end_date,
            daily_calorie_intake_min: p.daily_calorie_intake_min, daily_calorie_intake_max: p.daily_calorie_intake_max,
            daily_protein_min_g: p.daily_protein_min_g, daily_protein_max_g: p.daily_protein_max_g,
            daily_fat_min_g: p.daily_fat_min_g, daily_fat_max_g: p.daily_fat_max_g,
            daily_carb_min_g: p.daily_carb_min_g, daily_carb_max_g: p.daily_carb_max_g,
            daily_steps_target: p.daily_steps_target, is_active: p.is_active,
        };
        let result = goals::update_goal(&self.stores, p.id, data).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a goal")]
    fn delete_goal(&self, Parameters(p): Parameters<DeleteGoalParams>) -> Result<CallToolResult, McpError> {
        let result = goals::delete_goal(&self.stores, p.id).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Dashboard ---

    #[tool(description = "Evaluate the active goal against yesterday's record (or the latest one): elapsed period, on-track flag and per-metric verdicts for calories, protein, fat, carbohydrate and steps")]
    fn get_goal_progress(&self) -> Result<CallToolResult, McpError> {
        let result = dashboard::goal_progress(&self.stores, Utc::now(), self.config.utc_offset())
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(progress) => json_result(&progress),
            None => no_active_goal(),
        }
    }

    #[tool(description = "Get the active goal's linear target weight for each day of the trailing window, alongside recorded weights")]
    fn get_weight_trajectory(&self, Parameters(p): Parameters<WindowParams>) -> Result<CallToolResult, McpError> {
        let window = self.window_days(p.window_days);
        let result = dashboard::weight_trajectory(&self.stores, Utc::now(), self.config.utc_offset(), window)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(trajectory) => json_result(&trajectory),
            None => no_active_goal(),
        }
    }

    #[tool(description = "Get the most recent health record with weight change, intake calories and macro ratio")]
    fn get_latest_metrics(&self) -> Result<CallToolResult, McpError> {
        let result = dashboard::latest_metrics(&self.stores).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(metrics) => json_result(&metrics),
            None => Ok(CallToolResult::success(vec![Content::text(r#"{"error": "No health records yet"}"#)])),
        }
    }

    #[tool(description = "Compare each recorded day in the trailing window against the active goal's intake bands and step target")]
    fn get_goal_comparison(&self, Parameters(p): Parameters<WindowParams>) -> Result<CallToolResult, McpError> {
        let window = self.window_days(p.window_days);
        let result = dashboard::goal_comparison(&self.stores, Utc::now(), self.config.utc_offset(), window)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(comparison) => json_result(&comparison),
            None => no_active_goal(),
        }
    }

    #[tool(description = "Render the weight chart (recorded weights, linear target, target line) to a PNG file")]
    fn generate_weight_chart(&self, Parameters(p): Parameters<GenerateWeightChartParams>) -> Result<CallToolResult, McpError> {
        let now = Utc::now();
        let offset = self.config.utc_offset();
        let path = p.output_path.map(PathBuf::from).unwrap_or_else(|| {
            charts::default_chart_path(&self.config.database_path, resolve_today_in(now, offset))
        });
        let window = self.window_days(p.window_days);
        let result = charts::write_weight_chart(&self.stores, &path, now, offset, window, p.width, p.height)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for HealthDashService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "healthdash".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Health Dashboard".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Health Dashboard - daily body metrics, nutrition goals and weight trajectories. \
                 Records: record_health_data (merges into the day), get/list/update/delete_health_record. \
                 Goals: create/get/list/update/delete_goal; the newest active goal is the one evaluated. \
                 Dashboard: get_goal_progress (judges yesterday in UTC+9 by default), get_weight_trajectory, \
                 get_latest_metrics, get_goal_comparison, generate_weight_chart. \
                 Status: healthdash_status."
                    .into(),
            ),
        }
    }
}

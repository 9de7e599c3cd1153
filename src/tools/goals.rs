//! Goal MCP Tools

use serde::Serialize;

use crate::models::{Goal, GoalCreate, GoalUpdate};
use crate::progress::select_active_goal;
use crate::storage::Stores;

/// Response for list_goals
#[derive(Debug, Serialize)]
pub struct ListGoalsResponse {
    pub goals: Vec<Goal>,
    pub total: usize,
    pub active_only: bool,
}

/// Response for delete_goal
#[derive(Debug, Serialize)]
pub struct DeleteGoalResponse {
    pub id: i64,
    pub deleted: bool,
}

pub fn create_goal(stores: &Stores, data: GoalCreate) -> Result<Goal, String> {
    let goal = stores
        .goals
        .create_goal(&data)
        .map_err(|e| format!("Failed to create goal: {}", e))?;

    tracing::info!(id = goal.id, name = %goal.name, "Created goal");
    Ok(goal)
}

pub fn get_goal(stores: &Stores, id: i64) -> Result<Option<Goal>, String> {
    stores
        .goals
        .get_goal(id)
        .map_err(|e| format!("Failed to get goal: {}", e))
}

pub fn list_goals(stores: &Stores, active_only: bool) -> Result<ListGoalsResponse, String> {
    let goals = stores
        .goals
        .list_goals(active_only)
        .map_err(|e| format!("Failed to list goals: {}", e))?;

    Ok(ListGoalsResponse {
        total: goals.len(),
        goals,
        active_only,
    })
}

pub fn update_goal(stores: &Stores, id: i64, update: GoalUpdate) -> Result<Goal, String> {
    let goal = stores
        .goals
        .update_goal(id, &update)
        .map_err(|e| format!("Failed to update goal: {}", e))?
        .ok_or_else(|| format!("Goal not found: {}", id))?;

    tracing::info!(id, active = goal.is_active, "Updated goal");
    Ok(goal)
}

pub fn delete_goal(stores: &Stores, id: i64) -> Result<DeleteGoalResponse, String> {
    let deleted = stores
        .goals
        .delete_goal(id)
        .map_err(|e| format!("Failed to delete goal: {}", e))?;

    if !deleted {
        return Err(format!("Goal not found: {}", id));
    }

    tracing::info!(id, "Deleted goal");
    Ok(DeleteGoalResponse { id, deleted })
}

/// The goal dashboards evaluate: the most recently created active goal
pub fn get_active_goal(stores: &Stores) -> Result<Option<Goal>, String> {
    let goals = stores
        .goals
        .list_goals(true)
        .map_err(|e| format!("Failed to list goals: {}", e))?;

    if goals.len() > 1 {
        tracing::debug!(count = goals.len(), "Several active goals; using the newest");
    }
    Ok(select_active_goal(&goals).cloned())
}

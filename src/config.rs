/// Host-supplied configuration
///
/// The core owns no CLI flags and reads no environment variables; the host
/// process fills these structs in (the demo binary loads them from a RON
/// file).
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::Result;
use crate::pathfinding::astar::{
    DEFAULT_FAILURE_TIMEOUT_MS, DEFAULT_PRIMARY_TIMEOUT_MS, DEFAULT_SLICE_BUDGET_MS,
};
use crate::world::chunk_cache::DEFAULT_COLUMN_CAP;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Per-tick planning slice in milliseconds
    pub slice_budget_ms: f64,
    /// Cumulative budget before settling for best-so-far
    pub primary_timeout_ms: f64,
    /// Cumulative budget before giving up entirely
    pub failure_timeout_ms: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            slice_budget_ms: DEFAULT_SLICE_BUDGET_MS,
            primary_timeout_ms: DEFAULT_PRIMARY_TIMEOUT_MS,
            failure_timeout_ms: DEFAULT_FAILURE_TIMEOUT_MS,
        }
    }
}

/// Where the chunk cache persists, when it persists at all
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    pub base_dir: String,
    pub world_name: String,
    pub server_addr: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Inclusive world floor in block Y
    pub floor_y: i32,
    /// Exclusive world ceiling in block Y
    pub ceiling_y: i32,
    /// Soft cap on resident chunk columns
    pub column_cap: usize,
    pub persistence: Option<PersistenceConfig>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            floor_y: -64,
            ceiling_y: 320,
            column_cap: DEFAULT_COLUMN_CAP,
            persistence: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    pub step_timeout_ticks: u32,
    pub sprint: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            step_timeout_ticks: crate::executor::DEFAULT_STEP_TIMEOUT_TICKS,
            sprint: true,
        }
    }
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigatorConfig {
    pub planner: PlannerConfig,
    pub cache: CacheConfig,
    pub executor: ExecutorConfig,
}

impl NavigatorConfig {
    /// Load a config from a RON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&text)?)
    }
}

//! Core type definitions: ids, constants, and simulator configuration.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// ============================================================================
// Type Aliases
// ============================================================================

pub type ObjName = String;
pub type ObserverId = u64;

// ============================================================================
// Constants
// ============================================================================

pub const DEFAULT_EPS: f64 = 1e-8;
pub const DEFAULT_MAX_RETRIES: u32 = 64;

// ============================================================================
// Proper-time ordering key
// ============================================================================

/// Total-order wrapper over a proper-time value, used as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TauKey(pub f64);

impl Eq for TauKey {}

impl Ord for TauKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for TauKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<f64> for TauKey {
    fn from(tau: f64) -> Self {
        TauKey(tau)
    }
}

// ============================================================================
// Simulator Configuration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Proximity tolerance and bisection precision floor.
    pub eps: f64,
    /// Bisection retry budget per committed instant.
    pub max_retries: u32,
    /// Whether action start/end edges are logged as events.
    pub log_actions: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            eps: DEFAULT_EPS,
            max_retries: DEFAULT_MAX_RETRIES,
            log_actions: true,
        }
    }
}

impl SimConfig {
    pub fn sanitized(mut self) -> Self {
        if !(self.eps > 0.0) {
            self.eps = DEFAULT_EPS;
        }
        if self.max_retries == 0 {
            self.max_retries = DEFAULT_MAX_RETRIES;
        }
        self
    }
}

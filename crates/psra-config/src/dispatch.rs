//! Dispatch rules configuration.

use serde::{Deserialize, Serialize};

/// Points credited to a volunteer per closed incident.
const fn default_points_per_close() -> u32 {
    15
}

fn default_actor() -> String {
    String::from("supervisor")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchConfig {
    #[serde(default = "default_points_per_close")]
    pub points_per_close: u32,

    /// Name recorded as approver/canceler when the caller gives none.
    #[serde(default = "default_actor")]
    pub default_actor: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            points_per_close: default_points_per_close(),
            default_actor: default_actor(),
        }
    }
}

use serde::{Deserialize, Serialize};

/// Liveness of a procServ instance as seen from its runtime info file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InstanceState {
    /// The recorded pid answers a signal probe (or cannot be disproven).
    Running,
    /// A pid was recorded but the process no longer exists.
    Dead,
    /// No info file, or no pid recorded in it.
    Stopped,
}

impl InstanceState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Dead => "Dead",
            Self::Stopped => "Stopped",
        }
    }
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of `manage-procs status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusLine {
    pub name: String,
    pub state: InstanceState,
    /// Endpoints recorded by procServ. Only populated for running instances.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<String>,
}

/// Complete `status --json` document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StatusOutput {
    pub instances: Vec<StatusLine>,
}

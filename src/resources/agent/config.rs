use serde::{Deserialize, Serialize};

/// Who drives the agent's inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// The trainer drives inputs through step commands.
    #[default]
    Agent,
    /// A human plays; the bridge stays out of the way.
    Manual,
}

impl ControlMode {
    pub fn is_manual(self) -> bool {
        self == ControlMode::Manual
    }
}

use crate::server::Command;
use crate::simulation::InputState;

/// Substitutes held inputs into the host's input layer.
///
/// While enabled, the held state replaces the native source for every logical
/// input and persists until overwritten by the next command or cleared.
#[derive(Debug, Clone, Default)]
pub struct ActionInjector {
    inputs: InputState,
    enabled: bool,
}

impl ActionInjector {
    pub fn new(enabled: bool) -> Self {
        Self {
            inputs: InputState::default(),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn inputs(&self) -> InputState {
        self.inputs
    }

    /// Replaces every held input with the command's input bytes.
    pub fn apply_command(&mut self, command: &Command) {
        self.inputs = command.inputs();
    }

    /// Releases every input.
    pub fn reset_inputs(&mut self) {
        self.inputs = InputState::default();
    }

    /// Override to hand to the input layer; `None` leaves native input alone.
    pub fn effective(&self) -> Option<InputState> {
        self.enabled.then_some(self.inputs)
    }
}

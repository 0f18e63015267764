use simlink::{server::BridgeConfig, simulation::InputState};

/// Default configuration with resets that give up after `max_wait_frames`.
pub fn create_impatient_config(max_wait_frames: u32) -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.reset.max_wait_frames = max_wait_frames;
    config
}

pub fn no_input() -> InputState {
    InputState::default()
}

pub fn hold_right() -> InputState {
    InputState {
        right: true,
        ..Default::default()
    }
}

pub fn hold_right_and_attack() -> InputState {
    InputState {
        right: true,
        attack: true,
        ..Default::default()
    }
}

use simlink::{
    resources::ControlMode,
    server::{BridgeConfig, CommandType, StateFlag},
    simulation::SimulationQuery,
    systems::SimState,
};

use crate::common::{hold_right, TestBridgeBuilder};

#[test]
fn test_ready_announced_once_agent_accepts_input() {
    let mut app = TestBridgeBuilder::new().build();

    let ready = app
        .run_until_published(StateFlag::Ready, 20)
        .expect("Ready was never published");
    assert_eq!(ready.agent_health, ready.agent_max_health);
    assert_eq!(app.bridge.state(), SimState::Disabled);

    // Announced exactly once, and playback keeps running.
    let ticks = app.ticks();
    app.run_frames(20);
    assert!(!app.client.is_signalled().unwrap());
    assert_eq!(app.ticks(), ticks + 20);
}

#[test]
fn test_ready_waits_for_input_delay() {
    let mut app = TestBridgeBuilder::new().build();
    app.sim.trigger_hazard_respawn(10);

    app.run_frames(10);
    assert!(!app.client.is_signalled().unwrap());
    assert!(app.run_until_published(StateFlag::Ready, 10).is_some());
}

#[test]
fn test_manual_mode_is_inert() {
    let config = BridgeConfig {
        control_mode: ControlMode::Manual,
        ..Default::default()
    };
    let mut app = TestBridgeBuilder::new().with_config(config).build();

    app.send(CommandType::Step, hold_right());
    app.run_frames(30);

    assert!(app.client.command_pending().unwrap());
    assert!(!app.client.is_signalled().unwrap());
    assert_eq!(app.client.state_flag().unwrap(), StateFlag::None as i32);
    assert_eq!(app.bridge.state(), SimState::Disabled);
    assert_eq!(app.sim.input_override(), None);
    assert_eq!(app.sim.time_scale(), 1.0);
}

#[test]
fn test_step_accepted_before_first_reset() {
    let mut app = TestBridgeBuilder::new().build();

    let obs = app.step(hold_right());
    assert_eq!(app.bridge.state(), SimState::WaitingForAction);
    assert_eq!(app.sim.time_scale(), 0.0);
    assert!(obs.agent_vel_x > 0.0);
}

#[test]
fn test_reset_before_announcement_suppresses_ready() {
    let mut app = TestBridgeBuilder::new().build();
    assert!(!app.bridge.episode().ready);

    let obs = app.reset();
    assert_eq!(obs.terminated, 0);
    assert!(app.bridge.episode().ready);

    app.run_frames(20);
    assert!(!app.client.is_signalled().unwrap());
    assert_eq!(app.client.state_flag().unwrap(), StateFlag::Reset as i32);
}

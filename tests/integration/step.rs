use approx::assert_relative_eq;
use simlink::{
    server::{memory_name, CommandType, StateFlag},
    simulation::SimulationQuery,
    systems::SimState,
};

use crate::common::{hold_right, no_input, TestBridge, TestBridgeBuilder};

fn after_reset() -> TestBridge {
    let mut app = TestBridgeBuilder::new().build();
    app.reset();
    app
}

#[test]
fn test_step_runs_exactly_frames_per_step_ticks() {
    let mut app = after_reset();
    let frames = app.bridge.config().frames_per_step as u64;
    let dt = app.sim.fixed_delta();

    let mut previous = app.bridge.last_observation().episode_time;
    for _ in 0..3 {
        let ticks = app.ticks();
        let obs = app.step(no_input());

        assert_eq!(app.ticks(), ticks + frames);
        assert!(obs.episode_time > previous);
        assert_relative_eq!(obs.episode_time, previous + frames as f32 * dt, epsilon = 1e-5);
        assert!(!app.client.command_pending().unwrap());
        assert_eq!(app.client.state_flag().unwrap(), StateFlag::Step as i32);
        previous = obs.episode_time;
    }
}

#[test]
fn test_clock_frozen_between_steps() {
    let mut app = after_reset();
    app.step(no_input());

    let ticks = app.ticks();
    app.run_frames(25);
    assert_eq!(app.ticks(), ticks);
    assert_eq!(app.bridge.state(), SimState::WaitingForAction);
    assert!(!app.client.is_signalled().unwrap());
}

#[test]
fn test_held_inputs_move_agent() {
    let mut app = after_reset();
    let start = app.bridge.last_observation().agent_pos_x;

    let obs = app.step(hold_right());
    assert!(obs.agent_pos_x > start);
    assert_eq!(obs.agent_facing_right, 1);

    // Released on the next command.
    let moved = obs.agent_pos_x;
    let obs = app.step(no_input());
    assert_relative_eq!(obs.agent_pos_x, moved);
}

#[cfg(unix)]
#[test]
fn test_command_without_ready_is_ignored() {
    use std::os::unix::fs::FileExt;
    use simlink::server::COMMAND_READY_OFFSET;
    use simlink::utils::COMMAND_OFFSET;

    let mut app = after_reset();
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(app.shm_dir().join(memory_name(0)))
        .unwrap();

    // Step command written but never marked ready.
    file.write_all_at(&(CommandType::Step as i32).to_ne_bytes(), COMMAND_OFFSET as u64)
        .unwrap();
    file.write_all_at(&0i32.to_ne_bytes(), (COMMAND_OFFSET + COMMAND_READY_OFFSET) as u64)
        .unwrap();

    let ticks = app.ticks();
    app.run_frames(10);
    assert_eq!(app.ticks(), ticks);
    assert_eq!(app.client.state_flag().unwrap(), StateFlag::Reset as i32);
    assert!(!app.client.is_signalled().unwrap());

    // An unknown type is consumed without effect.
    file.write_all_at(&7i32.to_ne_bytes(), COMMAND_OFFSET as u64)
        .unwrap();
    file.write_all_at(&1i32.to_ne_bytes(), (COMMAND_OFFSET + COMMAND_READY_OFFSET) as u64)
        .unwrap();
    app.run_frames(3);
    assert!(!app.client.command_pending().unwrap());
    assert_eq!(app.ticks(), ticks);
    assert_eq!(app.bridge.state(), SimState::WaitingForAction);
}

#[cfg(unix)]
#[test]
fn test_reset_written_as_raw_packed_record_is_serviced() {
    use std::os::unix::fs::FileExt;

    let mut app = TestBridgeBuilder::new().build();
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(app.shm_dir().join(memory_name(0)))
        .unwrap();

    // Type at byte 1024, ready word at byte 1038, no input bytes held.
    file.write_all_at(&(CommandType::Reset as i32).to_ne_bytes(), 1024)
        .unwrap();
    file.write_all_at(&1i32.to_ne_bytes(), 1038).unwrap();

    let obs = app
        .run_until_published(StateFlag::Reset, 300)
        .expect("Reset was never published");
    assert_eq!(obs.terminated, 0);
    assert_eq!(app.client.state_flag().unwrap(), StateFlag::Reset as i32);
    assert!(!app.client.command_pending().unwrap());
    assert_eq!(app.bridge.state(), SimState::WaitingForAction);
}

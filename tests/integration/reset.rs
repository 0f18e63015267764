use glam::Vec2;
use pretty_assertions::assert_eq;
use simlink::{
    sandbox::{ArenaSim, AGENT_MAX_SILK, AGENT_SPAWN, BOSS_SPAWN},
    server::{CommandType, StateFlag},
    simulation::{SimulationQuery, Variable},
    systems::{ResetKind, SimState},
};

use crate::common::{
    assert_fresh_episode, assert_pose_eq, create_impatient_config, hold_right,
    hold_right_and_attack, no_input, TestBridgeBuilder,
};

#[test]
fn test_first_reset_is_hard_and_captures_baseline() {
    let mut app = TestBridgeBuilder::new().build();
    let old_boss = app.sim.boss();

    let obs = app.reset();
    assert_eq!(app.bridge.reset_controller().kind(), ResetKind::Hard);
    assert_fresh_episode(&obs);
    assert_eq!(app.bridge.state(), SimState::WaitingForAction);
    assert_eq!(app.sim.time_scale(), 0.0);

    // The reload spawned a new boss and the bridge resolved it.
    assert_ne!(app.sim.boss(), old_boss);
    assert_eq!(app.bridge.episode().boss, app.sim.boss());
    assert_eq!(obs.boss_health, 800);

    let baseline = app.bridge.reset_controller().baseline().unwrap();
    assert_eq!(baseline.agent.position, AGENT_SPAWN);
    assert_eq!(baseline.boss.map(|boss| boss.position), Some(BOSS_SPAWN));
}

#[test]
fn test_hard_reset_fast_forwards_while_loading() {
    let mut app = TestBridgeBuilder::new().build();
    let loading_scale = app.bridge.config().loading_time_scale();
    assert_eq!(loading_scale, 100.0);

    app.send(CommandType::Reset, no_input());
    let mut loading_frames = 0;
    let mut was_loading = false;
    for _ in 0..20 {
        app.run_frame();
        let loading = app.bridge.reset_controller().is_loading();
        if was_loading && loading {
            assert_eq!(app.sim.time_scale(), loading_scale);
            loading_frames += 1;
        }
        was_loading = loading;
    }
    assert!(loading_frames > 0);

    app.run_until_published(StateFlag::Reset, 200)
        .expect("Reset was never published");
    assert_eq!(app.sim.time_scale(), 0.0);
}

#[test]
fn test_reset_without_agent_takes_hard_path() {
    let mut sim = ArenaSim::arena();
    sim.despawn_agent();
    let mut app = TestBridgeBuilder::new().with_sim(sim).build();

    app.send(CommandType::Reset, no_input());
    app.run_frame();
    assert_eq!(app.bridge.state(), SimState::Resetting);
    assert_eq!(app.bridge.reset_controller().kind(), ResetKind::Hard);

    let obs = app
        .run_until_published(StateFlag::Reset, 200)
        .expect("Reset was never published");
    assert_fresh_episode(&obs);
    assert!(app.sim.agent().is_some());
    assert!(app.bridge.reset_controller().baseline().is_some());
}

#[test]
fn test_soft_reset_restores_baseline() {
    let mut app = TestBridgeBuilder::new().build();
    app.reset();
    let boss = app.sim.boss().unwrap();

    for _ in 0..5 {
        app.step(hold_right());
    }
    app.sim.set_health(boss, 500).unwrap();
    let obs = app.step(no_input());
    assert_eq!(obs.boss_phase, 1);

    let obs = app.reset();
    assert_eq!(app.bridge.reset_controller().kind(), ResetKind::Soft);
    assert_eq!(app.sim.boss(), Some(boss));
    assert_fresh_episode(&obs);
    assert_eq!(obs.boss_health, 800);
    assert_eq!(obs.agent_silk, AGENT_MAX_SILK);
    assert_eq!(obs.agent_pos_x, AGENT_SPAWN.x);
    assert_eq!(obs.boss_pos_x, BOSS_SPAWN.x);
    assert_eq!(app.sim.active_state(boss, "Control").as_deref(), Some("Idle"));

    // Everything the reset held is released.
    assert!(!app.sim.is_damage_blocked());
    assert_eq!(obs.agent_invincible, 0);
}

#[test]
fn test_soft_reset_is_idempotent() {
    let mut app = TestBridgeBuilder::new().build();
    app.reset();
    for _ in 0..10 {
        app.step(hold_right_and_attack());
    }

    let first = app.reset();
    let second = app.reset();
    assert_eq!(app.bridge.reset_controller().kind(), ResetKind::Soft);
    assert_pose_eq(&second, &first);
    assert_eq!(second.ray_hit_types, first.ray_hit_types);
}

#[test]
fn test_soft_reset_restores_boss_variables() {
    let mut app = TestBridgeBuilder::new().build();
    app.reset();
    let boss = app.sim.boss().unwrap();
    app.sim
        .set_variable(boss, "Control", "Attack Count", Variable::Int(9))
        .unwrap();

    app.reset();
    assert_eq!(
        app.sim.variable(boss, "Control", "Attack Count"),
        Some(Variable::Int(0))
    );
}

#[test]
fn test_machine_reset_failure_is_swallowed() {
    let mut app = TestBridgeBuilder::new().build();
    app.reset();
    let boss = app.sim.boss().unwrap();
    app.sim.fail_machine_reset("Stun Control");
    app.sim.set_state(boss, "Control", "Charge").unwrap();

    let obs = app.reset();
    assert_fresh_episode(&obs);
    assert_eq!(app.sim.active_state(boss, "Control").as_deref(), Some("Idle"));
}

#[test]
fn test_soft_reset_deactivates_live_hazards() {
    let mut app = TestBridgeBuilder::new().build();
    app.reset();
    let cross = app
        .sim
        .spawn_hazard("Cross Slash", AGENT_SPAWN + Vec2::new(0.0, 8.0));

    let obs = app.step(no_input());
    assert_eq!(obs.ray_hit_types[8], 4);

    let obs = app.reset();
    let object = app.sim.objects().into_iter().find(|o| o.id == cross).unwrap();
    assert!(!object.active);
    assert_ne!(obs.ray_hit_types[8], 4);
}

#[test]
fn test_reset_timeout_leaves_step_mode_disabled() {
    let mut app = TestBridgeBuilder::new()
        .with_config(create_impatient_config(30))
        .build();
    app.sim.trigger_hazard_respawn(1000);

    app.send(CommandType::Reset, no_input());
    assert!(app.run_until_published(StateFlag::Reset, 60).is_none());

    assert_eq!(app.bridge.state(), SimState::Disabled);
    assert!(app.bridge.reset_controller().will_force_hard());
    assert!(!app.sim.is_damage_blocked());
    assert_eq!(app.sim.time_scale(), 1.0);
}

#[test]
fn test_failed_reset_forces_hard_path() {
    let mut app = TestBridgeBuilder::new()
        .with_config(create_impatient_config(30))
        .build();
    app.reset();

    // Agent gone and the reload never finishes.
    app.sim.despawn_agent();
    app.sim.stall_loading(true);
    app.send(CommandType::Reset, no_input());
    assert!(app.run_until_published(StateFlag::Reset, 60).is_none());
    assert_eq!(app.bridge.state(), SimState::Disabled);

    app.sim.stall_loading(false);
    app.run_frames(20);
    assert!(app.sim.agent_status().unwrap().accepting_input);

    // Baseline and agent both exist, but the failure forces a reload.
    app.send(CommandType::Reset, no_input());
    app.run_frame();
    assert_eq!(app.bridge.reset_controller().kind(), ResetKind::Hard);
    let obs = app
        .run_until_published(StateFlag::Reset, 200)
        .expect("Reset was never published");
    assert_fresh_episode(&obs);
    assert!(!app.bridge.reset_controller().will_force_hard());

    // Back to normal.
    app.reset();
    assert_eq!(app.bridge.reset_controller().kind(), ResetKind::Soft);
}

use approx::assert_relative_eq;
use simlink::server::Observation;

/// Assert that an observation describes the first frame of an episode
#[track_caller]
pub fn assert_fresh_episode(obs: &Observation) {
    assert_eq!(obs.terminated, 0, "Fresh episode must not be terminated");
    assert_eq!(obs.truncated, 0, "Fresh episode must not be truncated");
    assert_eq!(obs.boss_phase, 0, "Boss phase must start at 0");
    assert_eq!(
        obs.agent_health, obs.agent_max_health,
        "Agent must start at full health"
    );
    assert!(obs.agent_max_health > 0);
    assert_eq!(obs.episode_time, 0.0);
}

/// Assert that two observations agree on every pose and health field
#[track_caller]
pub fn assert_pose_eq(actual: &Observation, expected: &Observation) {
    let pairs = [
        (actual.agent_pos_x, expected.agent_pos_x),
        (actual.agent_pos_y, expected.agent_pos_y),
        (actual.agent_vel_x, expected.agent_vel_x),
        (actual.agent_vel_y, expected.agent_vel_y),
        (actual.boss_pos_x, expected.boss_pos_x),
        (actual.boss_pos_y, expected.boss_pos_y),
        (actual.boss_vel_x, expected.boss_vel_x),
        (actual.boss_vel_y, expected.boss_vel_y),
    ];
    for (a, e) in pairs {
        assert_relative_eq!(a, e, epsilon = 1e-5);
    }
    assert_eq!(actual.agent_health, expected.agent_health);
    assert_eq!(actual.agent_silk, expected.agent_silk);
    assert_eq!(actual.boss_health, expected.boss_health);
    assert_eq!(actual.boss_phase, expected.boss_phase);
    assert_eq!(actual.agent_grounded, expected.agent_grounded);
    assert_eq!(actual.agent_facing_right, expected.agent_facing_right);
}

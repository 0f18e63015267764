use simlink::{
    sandbox::{AGENT_SPAWN, BOSS_RADIUS, BOSS_SPAWN, WALL_X},
    simulation::SimulationQuery,
    systems::HitClass,
    utils::MAX_RAY_DISTANCE,
};

use approx::assert_relative_eq;

use crate::common::{no_input, TestBridgeBuilder};

const EAST: usize = 0;
const WEST: usize = 16;
const DOWN: usize = 24;

#[test]
fn test_rays_see_boss_walls_and_floor() {
    let mut app = TestBridgeBuilder::new().build();
    let obs = app.reset();

    assert_eq!(obs.ray_hit_types[EAST], HitClass::Enemy as i32);
    let boss_distance = BOSS_SPAWN.x - AGENT_SPAWN.x - BOSS_RADIUS;
    assert_relative_eq!(
        obs.ray_distances[EAST],
        boss_distance / MAX_RAY_DISTANCE,
        epsilon = 1e-5
    );

    assert_eq!(obs.ray_hit_types[WEST], HitClass::Terrain as i32);
    assert_relative_eq!(
        obs.ray_distances[WEST],
        (AGENT_SPAWN.x + WALL_X) / MAX_RAY_DISTANCE,
        epsilon = 1e-5
    );

    assert_eq!(obs.ray_hit_types[DOWN], HitClass::Terrain as i32);
    assert_relative_eq!(
        obs.ray_distances[DOWN],
        AGENT_SPAWN.y / MAX_RAY_DISTANCE,
        epsilon = 1e-4
    );
}

#[test]
fn test_circle_slash_reported_until_spent() {
    let mut app = TestBridgeBuilder::new().build();
    app.reset();

    let slash_present = |app: &crate::common::TestBridge| {
        app.sim
            .objects()
            .iter()
            .any(|object| object.name.contains("lace_circle_slash"))
    };

    let mut obs = app.step(no_input());
    for _ in 0..100 {
        if slash_present(&app) {
            break;
        }
        obs = app.step(no_input());
    }
    assert!(slash_present(&app), "Boss never released a circle slash");
    // Reported while winding up, before it can deal damage.
    assert_eq!(obs.ray_hit_types[EAST], HitClass::Hazard as i32);

    let mut spent_seen = false;
    while slash_present(&app) {
        obs = app.step(no_input());
        if slash_present(&app) && obs.ray_hit_types[EAST] == HitClass::Enemy as i32 {
            spent_seen = true;
        }
    }
    assert!(spent_seen, "Slash was still reported after its active window");
}

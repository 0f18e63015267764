use bevy::{app::ScheduleRunnerPlugin, prelude::*};
use std::time::Duration;

use super::staging::{FrameStage, FrameStagePlugin};
use crate::sandbox::ArenaSim;
use crate::simulation::SimulationQuery;

/// Schedule runner that paces the headless host at `frame_rate` frames per
/// second, so frame-counted reset bounds track wall time.
pub fn frame_runner(frame_rate: f64) -> ScheduleRunnerPlugin {
    ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / frame_rate))
}

/// Runs an [`ArenaSim`] on bevy's fixed timestep, with virtual time
/// following the arena's time scale.
pub struct SandboxPlugin;

impl Plugin for SandboxPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<FrameStagePlugin>() {
            app.add_plugins(FrameStagePlugin);
        }
        let arena = ArenaSim::arena();
        app.insert_resource(Time::<Fixed>::from_seconds(arena.fixed_delta() as f64))
            .insert_resource(arena)
            .add_systems(FixedUpdate, advance_arena)
            .add_systems(Update, end_arena_frame.in_set(FrameStage::Simulation))
            .add_systems(PostUpdate, follow_time_scale);
    }
}

fn advance_arena(mut arena: ResMut<ArenaSim>) {
    arena.advance();
}

fn end_arena_frame(mut arena: ResMut<ArenaSim>) {
    arena.end_frame();
}

/// Pauses virtual time while the arena is frozen so no fixed ticks queue up.
fn follow_time_scale(arena: Res<ArenaSim>, mut time: ResMut<Time<Virtual>>) {
    let scale = arena.time_scale();
    if scale <= 0.0 {
        if !time.is_paused() {
            time.pause();
        }
        return;
    }
    if time.is_paused() {
        time.unpause();
    }
    if time.relative_speed() != scale {
        time.set_relative_speed(scale);
    }
}

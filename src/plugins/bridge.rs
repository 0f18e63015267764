use bevy::prelude::*;
use std::marker::PhantomData;

use super::staging::{FrameStage, FrameStagePlugin};
use crate::simulation::SimulationQuery;
use crate::systems::Orchestrator;

/// Drives an [`Orchestrator`] resource against the simulation resource `S`.
///
/// The orchestrator must be inserted by the caller, since opening the
/// shared region can fail.
pub struct BridgePlugin<S> {
    _simulation: PhantomData<fn() -> S>,
}

impl<S> Default for BridgePlugin<S> {
    fn default() -> Self {
        Self {
            _simulation: PhantomData,
        }
    }
}

impl<S: SimulationQuery + Resource> Plugin for BridgePlugin<S> {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<FrameStagePlugin>() {
            app.add_plugins(FrameStagePlugin);
        }
        app.add_systems(Update, bridge_frame::<S>.in_set(FrameStage::Bridge))
            .add_systems(FixedPostUpdate, bridge_fixed_tick::<S>);
    }
}

fn bridge_frame<S: SimulationQuery + Resource>(
    mut bridge: ResMut<Orchestrator>,
    mut sim: ResMut<S>,
) {
    bridge.update(&mut *sim);
}

fn bridge_fixed_tick<S: SimulationQuery + Resource>(
    mut bridge: ResMut<Orchestrator>,
    mut sim: ResMut<S>,
) {
    bridge.fixed_update(&mut *sim);
}

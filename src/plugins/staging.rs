use bevy::prelude::*;

/// Per-frame ordering: the simulation finishes its frame before the bridge
/// polls, so the bridge always sees the frame's final state.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum FrameStage {
    Simulation,
    Bridge,
}

pub struct FrameStagePlugin;

impl Plugin for FrameStagePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(Update, (FrameStage::Simulation, FrameStage::Bridge).chain());
    }
}

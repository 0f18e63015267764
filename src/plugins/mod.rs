mod bridge;
mod sandbox;
mod staging;

pub use bridge::BridgePlugin;
pub use sandbox::{frame_runner, SandboxPlugin};
pub use staging::{FrameStage, FrameStagePlugin};

mod assertions;
mod fixtures;
mod harness;

// Re-export
pub use assertions::{assert_fresh_episode, assert_pose_eq};
pub use fixtures::*;
pub use harness::{run_frame, TestBridge, TestBridgeBuilder};

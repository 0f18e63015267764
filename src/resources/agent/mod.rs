mod config;
mod input;
mod update_control;

pub use config::ControlMode;
pub use input::ActionInjector;
pub use update_control::StepControl;

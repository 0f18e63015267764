mod animation;
mod boss;

pub use animation::AgentAnimation;
pub use boss::{resolve_boss, BossAttackState, BossPhaseTracker, BossStateMapper};

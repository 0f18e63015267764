//! Agent animation clips as stable integer tags.

/// Animation tag reported in the observation. Discriminants are part of the
/// wire contract and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum AgentAnimation {
    Idle = 0,
    Airborne = 1,
    Land = 2,
    IdleToRun = 3,
    RunToIdle = 4,
    Turn = 5,
    WoundDoubleStrike = 6,
    Stun = 7,
    Recoil = 8,
    Dash = 9,
    Sprint = 10,
    DashToIdle = 11,
    SlashAlt = 12,
    SlashLandRunAlt = 13,
    DashAttackAntic = 14,
    SlashLand = 15,
    DashToRun = 16,
    UpSlash = 17,
    Slash = 18,
    DownSpikeAntic = 19,
    DownSpike = 20,
    DownspikeRecovery = 21,
    DownSpikeBounce2 = 22,
    DownSpikeBounce1 = 23,
    RecoilTwirl = 24,
    LandToRun = 25,
    SkidEnd1 = 26,
    HarpoonAntic = 27,
    HarpoonThrow = 28,
    HarpoonDash = 29,
    HarpoonCatch = 30,
    SilkChargeEnd = 31,
    AirDash = 32,
    SprintAir = 33,
    SprintAirLoop = 34,
    NeedleThrowAnticG = 35,
    NeedleThrowThrowing = 36,
    NeedleThrowCatch = 37,
    DoubleJump = 38,
    Walljump = 39,
    WallSlide = 40,
    DashAttack = 41,
    DashAttackRecover = 42,
    SlashToRun = 43,
    Run = 44,
    SkidEnd2 = 45,
    SprintAirShort = 46,
    MantleCling = 47,
    MantleVault = 48,
    SlashLandRun = 49,
    Wound = 50,
    HazardRespawn = 51,
    MantleLand = 52,
    MantleLandToRun = 53,
    SprintTurn = 54,
    NeedleThrowAnticA = 55,
    UmbrellaInflateAntic = 56,
    UmbrellaInflate = 57,
    UmbrellaFloat = 58,
    DownspikeRecoveryLand = 59,
    DashDown = 60,
    ShuttlecockAntic = 61,
    Shuttlecock = 62,
    SprintBackflip = 63,
    UmbrellaDeflate = 64,
    DashDownLand = 65,
    UmbrellaTurn = 66,
    MantleCancelToJump = 67,
    IdleHurt = 68,
    LookDown = 69,
    LookDownEnd = 70,
    LookUp = 71,
    LookUpEnd = 72,
    BindChargeGround = 73,
    BindBurstGround = 74,
    BindChargeAir = 75,
    BindBurstAir = 76,
    Fall = 77,
    WallCling = 78,
    WalljumpAntic = 79,
    HardLand = 80,
    Walk = 81,
    #[default]
    Unknown = 82,
}

const CLIP_TABLE: [(&str, AgentAnimation); 82] = [
    ("Idle", AgentAnimation::Idle),
    ("Airborne", AgentAnimation::Airborne),
    ("Land", AgentAnimation::Land),
    ("Idle To Run", AgentAnimation::IdleToRun),
    ("Run To Idle", AgentAnimation::RunToIdle),
    ("Turn", AgentAnimation::Turn),
    ("Wound Double Strike", AgentAnimation::WoundDoubleStrike),
    ("Stun", AgentAnimation::Stun),
    ("Recoil", AgentAnimation::Recoil),
    ("Dash", AgentAnimation::Dash),
    ("Sprint", AgentAnimation::Sprint),
    ("Dash To Idle", AgentAnimation::DashToIdle),
    ("SlashAlt", AgentAnimation::SlashAlt),
    ("Slash Land Run Alt", AgentAnimation::SlashLandRunAlt),
    ("Dash Attack Antic", AgentAnimation::DashAttackAntic),
    ("Slash Land", AgentAnimation::SlashLand),
    ("Dash To Run", AgentAnimation::DashToRun),
    ("UpSlash", AgentAnimation::UpSlash),
    ("Slash", AgentAnimation::Slash),
    ("DownSpike Antic", AgentAnimation::DownSpikeAntic),
    ("DownSpike", AgentAnimation::DownSpike),
    ("Downspike Recovery", AgentAnimation::DownspikeRecovery),
    ("DownSpike Bounce 2", AgentAnimation::DownSpikeBounce2),
    ("DownSpike Bounce 1", AgentAnimation::DownSpikeBounce1),
    ("Recoil Twirl", AgentAnimation::RecoilTwirl),
    ("Land To Run", AgentAnimation::LandToRun),
    ("Skid End 1", AgentAnimation::SkidEnd1),
    ("Harpoon Antic", AgentAnimation::HarpoonAntic),
    ("Harpoon Throw", AgentAnimation::HarpoonThrow),
    ("Harpoon Dash", AgentAnimation::HarpoonDash),
    ("Harpoon Catch", AgentAnimation::HarpoonCatch),
    ("Silk Charge End", AgentAnimation::SilkChargeEnd),
    ("Air Dash", AgentAnimation::AirDash),
    ("Sprint Air", AgentAnimation::SprintAir),
    ("Sprint Air Loop", AgentAnimation::SprintAirLoop),
    ("NeedleThrow AnticG", AgentAnimation::NeedleThrowAnticG),
    ("NeedleThrow Throwing", AgentAnimation::NeedleThrowThrowing),
    ("NeedleThrow Catch", AgentAnimation::NeedleThrowCatch),
    ("Double Jump", AgentAnimation::DoubleJump),
    ("Walljump", AgentAnimation::Walljump),
    ("Wall Slide", AgentAnimation::WallSlide),
    ("Dash Attack", AgentAnimation::DashAttack),
    ("Dash Attack Recover", AgentAnimation::DashAttackRecover),
    ("Slash To Run", AgentAnimation::SlashToRun),
    ("Run", AgentAnimation::Run),
    ("Skid End 2", AgentAnimation::SkidEnd2),
    ("Sprint Air Short", AgentAnimation::SprintAirShort),
    ("Mantle Cling", AgentAnimation::MantleCling),
    ("Mantle Vault", AgentAnimation::MantleVault),
    ("Slash Land Run", AgentAnimation::SlashLandRun),
    ("Wound", AgentAnimation::Wound),
    ("Hazard Respawn", AgentAnimation::HazardRespawn),
    ("Mantle Land", AgentAnimation::MantleLand),
    ("Mantle Land To Run", AgentAnimation::MantleLandToRun),
    ("Sprint Turn", AgentAnimation::SprintTurn),
    ("NeedleThrow AnticA", AgentAnimation::NeedleThrowAnticA),
    ("Umbrella Inflate Antic", AgentAnimation::UmbrellaInflateAntic),
    ("Umbrella Inflate", AgentAnimation::UmbrellaInflate),
    ("Umbrella Float", AgentAnimation::UmbrellaFloat),
    ("Downspike Recovery Land", AgentAnimation::DownspikeRecoveryLand),
    ("Dash Down", AgentAnimation::DashDown),
    ("Shuttlecock Antic", AgentAnimation::ShuttlecockAntic),
    ("Shuttlecock", AgentAnimation::Shuttlecock),
    ("Sprint Backflip", AgentAnimation::SprintBackflip),
    ("Umbrella Deflate", AgentAnimation::UmbrellaDeflate),
    ("Dash Down Land", AgentAnimation::DashDownLand),
    ("Umbrella Turn", AgentAnimation::UmbrellaTurn),
    ("Mantle Cancel To Jump", AgentAnimation::MantleCancelToJump),
    ("Idle Hurt", AgentAnimation::IdleHurt),
    ("LookDown", AgentAnimation::LookDown),
    ("LookDownEnd", AgentAnimation::LookDownEnd),
    ("LookUp", AgentAnimation::LookUp),
    ("LookUpEnd", AgentAnimation::LookUpEnd),
    ("BindCharge Ground", AgentAnimation::BindChargeGround),
    ("BindBurst Ground", AgentAnimation::BindBurstGround),
    ("BindCharge Air", AgentAnimation::BindChargeAir),
    ("BindBurst Air", AgentAnimation::BindBurstAir),
    ("Fall", AgentAnimation::Fall),
    ("Wall Cling", AgentAnimation::WallCling),
    ("Walljump Antic", AgentAnimation::WalljumpAntic),
    ("Hard Land", AgentAnimation::HardLand),
    ("Walk", AgentAnimation::Walk),
];

impl AgentAnimation {
    /// Tag for a clip name. Names are matched exactly; anything else is `Unknown`.
    pub fn from_clip(clip: &str) -> Self {
        CLIP_TABLE
            .iter()
            .find(|(name, _)| *name == clip)
            .map_or(AgentAnimation::Unknown, |(_, tag)| *tag)
    }

    pub fn tag(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_discriminants() {
        for (index, (_, tag)) in CLIP_TABLE.iter().enumerate() {
            assert_eq!(tag.tag(), index as i32);
        }
    }

    #[test]
    fn test_clip_lookup() {
        assert_eq!(AgentAnimation::from_clip("Idle"), AgentAnimation::Idle);
        assert_eq!(AgentAnimation::from_clip("Slash").tag(), 18);
        assert_eq!(AgentAnimation::from_clip("Walk").tag(), 81);
        assert_eq!(AgentAnimation::from_clip("idle"), AgentAnimation::Unknown);
        assert_eq!(AgentAnimation::from_clip("").tag(), 82);
    }
}

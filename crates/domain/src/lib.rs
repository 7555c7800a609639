pub mod actor;
pub mod error;
pub mod event;
pub mod ids;
pub mod rules;
pub mod scene;
pub mod speaker;

pub use actor::{
    change_summary, diff_resources, AbilityScore, ActorContext, CharacterSheet, CharacterSummary,
    ResourcePool, Role, StatChange,
};
pub use error::DomainError;
pub use event::{Channel, EventKind, SessionEvent};
pub use ids::{CharacterId, EventId, SessionId, UserId};
pub use rules::{
    check_success, clamp_modifier, clamp_target, roll, skill_base, DiceRollResult, SkillCheck,
    SuccessLevel, MAX_ROLL_MODIFIER,
};
pub use scene::{SceneField, SceneState};
pub use speaker::{resolve_speaker, SpeakerIdentity, SpeakerProfile};

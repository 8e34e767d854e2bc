//! Multi-step wizard: step sequence, per-step schemas, typed updates, the
//! state store, its persistence bridge, and the session that drives them.

pub mod persistence;
pub mod routes;
pub mod session;
pub mod state;
pub mod steps;
pub mod store;
pub mod update;

pub use persistence::{PROFILE_SLOT_KEY, PersistenceBridge, rehydrate};
pub use routes::wizard_routes;
pub use session::{WizardSession, WizardSnapshot};
pub use state::{STEP_ORDER, WizardStep};
pub use steps::{StepSchema, schema_for};
pub use store::{StoreObserver, WizardStore};
pub use update::{
    ExperienceEducationUpdate, InterestsHobbiesUpdate, PersonalUpdate, SkillsLanguagesUpdate,
    StepUpdate,
};

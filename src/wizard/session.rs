//! Wizard session: the single-user controller over the store.
//!
//! Owns the [`WizardStore`] behind an async lock, wires the persistence
//! bridge in as an observer, and runs the step gate before navigation.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::WizardError;
use crate::profile::ProfileData;
use crate::store::KeyValueSlot;
use crate::submission::{SubmissionService, SubmitOutcome};

use super::persistence::{PersistenceBridge, rehydrate};
use super::state::WizardStep;
use super::steps::schema_for;
use super::store::WizardStore;
use super::update::StepUpdate;

/// What the rendering layer sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    pub data: ProfileData,
    pub step_index: usize,
    pub steps: Vec<WizardStep>,
    pub current_step: WizardStep,
}

impl From<&WizardStore> for WizardSnapshot {
    fn from(store: &WizardStore) -> Self {
        Self {
            data: store.data().clone(),
            step_index: store.step_index(),
            steps: store.steps().to_vec(),
            current_step: store.current_step(),
        }
    }
}

pub struct WizardSession {
    store: Mutex<WizardStore>,
    bridge: Arc<PersistenceBridge>,
    submissions: Arc<SubmissionService>,
}

impl WizardSession {
    /// Rehydrate from `slot` and start mirroring every change back into it.
    pub async fn open(slot: Arc<dyn KeyValueSlot>, submissions: Arc<SubmissionService>) -> Self {
        let data = rehydrate(&*slot).await;
        let (bridge, _writer) = PersistenceBridge::spawn(slot);

        let mut store = WizardStore::with_profile(data);
        store.subscribe(bridge.clone());
        info!(step = %store.current_step(), "Wizard session opened");

        Self {
            store: Mutex::new(store),
            bridge,
            submissions,
        }
    }

    pub async fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot::from(&*self.store.lock().await)
    }

    /// Autosave: merge without validating or moving.
    pub async fn save_draft(&self, update: StepUpdate) -> WizardSnapshot {
        let mut store = self.store.lock().await;
        store.merge(update);
        WizardSnapshot::from(&*store)
    }

    /// Validate the current step's draft, then merge it and move forward.
    ///
    /// On failure nothing is merged and the cursor stays put.
    pub async fn next(&self, update: StepUpdate) -> Result<WizardSnapshot, WizardError> {
        let mut store = self.store.lock().await;
        let current = store.current_step();
        if update.step() != current {
            return Err(WizardError::StepMismatch {
                expected: current.id().to_string(),
                got: update.step().id().to_string(),
            });
        }

        let draft = update.draft_over(store.data());
        if let Err(errors) = schema_for(current).validate(&draft) {
            debug!(step = %current, fields = errors.len(), "Step gate rejected draft");
            return Err(WizardError::StepInvalid {
                step: current.id().to_string(),
                errors,
            });
        }

        store.merge(update);
        store.advance();
        Ok(WizardSnapshot::from(&*store))
    }

    pub async fn back(&self) -> WizardSnapshot {
        let mut store = self.store.lock().await;
        store.retreat();
        WizardSnapshot::from(&*store)
    }

    /// Unknown step ids leave the cursor where it is.
    pub async fn jump(&self, step_id: &str) -> WizardSnapshot {
        let mut store = self.store.lock().await;
        store.jump_to_id(step_id);
        WizardSnapshot::from(&*store)
    }

    /// Commit the whole profile. Only available from the last step; the
    /// store is reset only when a record was created.
    pub async fn submit(&self) -> Result<SubmitOutcome, WizardError> {
        let mut store = self.store.lock().await;
        if !store.is_last_step() {
            return Err(WizardError::NotAtFinalStep);
        }

        let outcome = self.submissions.submit(store.data()).await;
        if outcome.is_created() {
            store.reset();
        }
        Ok(outcome)
    }

    pub async fn reset(&self) -> WizardSnapshot {
        let mut store = self.store.lock().await;
        store.reset();
        WizardSnapshot::from(&*store)
    }

    /// Wait until every change so far has reached the slot.
    pub async fn flush(&self) {
        self.bridge.flush().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{
        EducationEntry, ExperienceEntry, LanguageEntry, Proficiency, SkillEntry, SkillLevel,
    };
    use crate::store::{LibSqlBackend, RecordStore};
    use crate::submission::LogNotifier;
    use crate::wizard::update::{
        ExperienceEducationUpdate, InterestsHobbiesUpdate, PersonalUpdate, SkillsLanguagesUpdate,
    };

    async fn open_session() -> (WizardSession, Arc<LibSqlBackend>) {
        let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let submissions = Arc::new(SubmissionService::new(db.clone(), Arc::new(LogNotifier)));
        let session = WizardSession::open(db.clone(), submissions).await;
        (session, db)
    }

    fn personal() -> StepUpdate {
        StepUpdate::Personal(PersonalUpdate {
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            email: Some("jane@x.com".into()),
            phone: Some("+15551234567".into()),
            ..Default::default()
        })
    }

    fn skills(count: usize) -> StepUpdate {
        let names = ["Go", "Rust", "SQL", "C"];
        StepUpdate::SkillsLanguages(SkillsLanguagesUpdate {
            skills: Some(
                names[..count]
                    .iter()
                    .map(|n| SkillEntry {
                        name: n.to_string(),
                        level: SkillLevel::Advanced,
                    })
                    .collect(),
            ),
            languages: Some(vec![LanguageEntry {
                name: "English".into(),
                proficiency: Proficiency::Native,
            }]),
        })
    }

    fn work() -> StepUpdate {
        StepUpdate::WorkExperience(ExperienceEducationUpdate {
            experiences: Some(vec![ExperienceEntry {
                company: "Acme".into(),
                title: "Engineer".into(),
                location: "Remote".into(),
                start_date: "2020-01-01".into(),
                end_date: Some(String::new()),
                current: Some(true),
                description: None,
            }]),
            education: Some(vec![EducationEntry {
                school: "MIT".into(),
                degree: "BSc".into(),
                field: "CS".into(),
                start_date: "2012-09-01".into(),
                end_date: Some("2016-06-01".into()),
            }]),
        })
    }

    fn interests() -> StepUpdate {
        StepUpdate::InterestsHobbies(InterestsHobbiesUpdate {
            interests: Some(vec!["chess".into()]),
            hobbies: None,
        })
    }

    #[tokio::test]
    async fn next_gates_on_the_current_step() {
        let (session, _db) = open_session().await;
        session.next(personal()).await.unwrap();

        let err = session.next(skills(2)).await.unwrap_err();
        match err {
            WizardError::StepInvalid { step, errors } => {
                assert_eq!(step, "skills_languages");
                assert_eq!(errors.messages("skills"), ["Please add at least three skills."]);
            }
            other => panic!("expected StepInvalid, got {other:?}"),
        }

        // Nothing merged, cursor unchanged.
        let snap = session.snapshot().await;
        assert_eq!(snap.step_index, 1);
        assert!(snap.data.skills.is_empty());
        assert_eq!(snap.data.first_name, "Jane");
    }

    #[tokio::test]
    async fn next_rejects_update_for_another_step() {
        let (session, _db) = open_session().await;
        let err = session.next(skills(3)).await.unwrap_err();
        assert!(matches!(
            err,
            WizardError::StepMismatch { ref expected, ref got }
                if expected == "personal" && got == "skills_languages"
        ));
        assert_eq!(session.snapshot().await.step_index, 0);
    }

    #[tokio::test]
    async fn draft_saves_without_moving() {
        let (session, _db) = open_session().await;
        let snap = session.save_draft(skills(1)).await;
        assert_eq!(snap.step_index, 0);
        assert_eq!(snap.data.skills.len(), 1);
    }

    #[tokio::test]
    async fn back_keeps_entered_data() {
        let (session, _db) = open_session().await;
        session.next(personal()).await.unwrap();
        session.next(skills(3)).await.unwrap();

        let snap = session.back().await;
        assert_eq!(snap.current_step, WizardStep::SkillsLanguages);
        assert_eq!(snap.data.skills.len(), 3);
        assert_eq!(snap.data.email, "jane@x.com");
    }

    #[tokio::test]
    async fn jump_ignores_unknown_ids() {
        let (session, _db) = open_session().await;
        assert_eq!(session.jump("work_experience").await.step_index, 2);
        assert_eq!(session.jump("payment").await.step_index, 2);
    }

    #[tokio::test]
    async fn submit_requires_final_step() {
        let (session, _db) = open_session().await;
        assert!(matches!(
            session.submit().await,
            Err(WizardError::NotAtFinalStep)
        ));
    }

    #[tokio::test]
    async fn full_walk_submits_and_resets() {
        let (session, db) = open_session().await;
        session.next(personal()).await.unwrap();
        session.next(skills(3)).await.unwrap();
        session.next(work()).await.unwrap();
        let snap = session.next(interests()).await.unwrap();
        assert_eq!(snap.step_index, 3);
        assert_eq!(snap.data.experiences[0].end_date, None);

        let outcome = session.submit().await.unwrap();
        match outcome {
            SubmitOutcome::Created { record, .. } => assert_eq!(record.email(), "jane@x.com"),
            other => panic!("expected Created, got {other:?}"),
        }

        let snap = session.snapshot().await;
        assert_eq!(snap.step_index, 0);
        assert_eq!(snap.data, ProfileData::empty());
        assert!(db.find_by_email("jane@x.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn conflict_keeps_the_wizard_state() {
        let (session, db) = open_session().await;
        let mut existing = ProfileData::empty();
        existing.email = "jane@x.com".into();
        db.create_unique(&existing).await.unwrap();

        session.next(personal()).await.unwrap();
        session.jump("interests_hobbies").await;
        assert_eq!(session.submit().await.unwrap(), SubmitOutcome::Conflict);

        let snap = session.snapshot().await;
        assert_eq!(snap.step_index, 3);
        assert_eq!(snap.data.first_name, "Jane");
    }

    #[tokio::test]
    async fn reopened_session_restarts_at_first_step() {
        let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let submissions = Arc::new(SubmissionService::new(db.clone(), Arc::new(LogNotifier)));

        let first = WizardSession::open(db.clone(), submissions.clone()).await;
        first.next(personal()).await.unwrap();
        first.next(skills(3)).await.unwrap();
        first.flush().await;
        drop(first);

        let second = WizardSession::open(db, submissions).await;
        let snap = second.snapshot().await;
        assert_eq!(snap.step_index, 0);
        assert_eq!(snap.data.first_name, "Jane");
        assert_eq!(snap.data.skills.len(), 3);
    }
}

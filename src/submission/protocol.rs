//! Submission commit protocol: validate, create under the per-email
//! uniqueness constraint, then send the confirmation.
//!
//! Every outcome is returned as data. Storage and delivery faults are logged
//! here and never propagate past [`SubmissionService::submit`].

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::profile::{FieldErrors, ProfileData, parse_profile, validate_profile};
use crate::store::{CreateOutcome, RecordStore, SubmittedRecord};

use super::notify::{CONFIRMATION_SUBJECT, Notifier};

pub const CONFLICT_MESSAGE: &str = "A submission with this email already exists.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Terminal result of one submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The record exists. `confirmation_sent` is false when the record was
    /// written but the notification could not be delivered.
    Created {
        record: SubmittedRecord,
        confirmation_sent: bool,
    },
    /// Schema violations; nothing was written or sent.
    Invalid(FieldErrors),
    /// A record for this email already exists; nothing was sent.
    Conflict,
    /// The record store failed.
    Failed,
}

impl SubmitOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, SubmitOutcome::Created { .. })
    }
}

pub struct SubmissionService {
    records: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
}

impl SubmissionService {
    pub fn new(records: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { records, notifier }
    }

    /// Run the protocol on an untyped request body.
    pub async fn submit_json(&self, body: &Value) -> SubmitOutcome {
        match parse_profile(body) {
            Ok(profile) => self.submit(&profile).await,
            Err(errors) => {
                info!(fields = errors.len(), "Submission rejected by schema");
                SubmitOutcome::Invalid(errors)
            }
        }
    }

    /// Run the protocol on a typed profile.
    pub async fn submit(&self, profile: &ProfileData) -> SubmitOutcome {
        if let Err(errors) = validate_profile(profile) {
            info!(fields = errors.len(), "Submission rejected by schema");
            return SubmitOutcome::Invalid(errors);
        }

        let record = match self.records.create_unique(profile).await {
            Ok(CreateOutcome::Created(record)) => record,
            Ok(CreateOutcome::Conflict) => {
                info!(email = %profile.email, "Submission conflicts with an existing record");
                return SubmitOutcome::Conflict;
            }
            Err(e) => {
                error!("Failed to store submission: {}", e);
                return SubmitOutcome::Failed;
            }
        };

        let confirmation_sent = match self
            .notifier
            .send(
                record.email(),
                CONFIRMATION_SUBJECT,
                &record.profile.summary(),
            )
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(id = %record.id, "Submission stored but confirmation failed: {}", e);
                false
            }
        };

        info!(id = %record.id, confirmation_sent, "Submission created");
        SubmitOutcome::Created {
            record,
            confirmation_sent,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::error::{DatabaseError, NotifyError};
    use crate::profile::{LanguageEntry, Proficiency, SkillEntry, SkillLevel};
    use crate::store::LibSqlBackend;

    /// Record store that counts calls and delegates to in-memory libSQL.
    struct CountingRecords {
        inner: LibSqlBackend,
        creates: AtomicUsize,
        fail: bool,
    }

    impl CountingRecords {
        async fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                inner: LibSqlBackend::new_memory().await.unwrap(),
                creates: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl RecordStore for CountingRecords {
        async fn create_unique(
            &self,
            profile: &ProfileData,
        ) -> Result<CreateOutcome, DatabaseError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DatabaseError::Query("disk full".into()));
            }
            self.inner.create_unique(profile).await
        }

        async fn find_by_email(
            &self,
            email: &str,
        ) -> Result<Option<SubmittedRecord>, DatabaseError> {
            self.inner.find_by_email(email).await
        }
    }

    #[derive(Default)]
    struct CountingNotifier {
        sent: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Transport("connection refused".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn valid_profile(email: &str) -> ProfileData {
        ProfileData {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: email.into(),
            phone: "+15551234567".into(),
            skills: vec![
                SkillEntry {
                    name: "Go".into(),
                    level: SkillLevel::Advanced,
                },
                SkillEntry {
                    name: "Rust".into(),
                    level: SkillLevel::Intermediate,
                },
                SkillEntry {
                    name: "SQL".into(),
                    level: SkillLevel::Beginner,
                },
            ],
            languages: vec![LanguageEntry {
                name: "English".into(),
                proficiency: Proficiency::Native,
            }],
            interests: vec!["chess".into()],
            ..Default::default()
        }
    }

    async fn service(
        records_fail: bool,
        notify_fail: bool,
    ) -> (SubmissionService, Arc<CountingRecords>, Arc<CountingNotifier>) {
        let records = CountingRecords::new(records_fail).await;
        let notifier = Arc::new(CountingNotifier {
            fail: notify_fail,
            ..Default::default()
        });
        let service = SubmissionService::new(records.clone(), notifier.clone());
        (service, records, notifier)
    }

    #[tokio::test]
    async fn valid_submission_is_created_and_confirmed() {
        let (service, records, notifier) = service(false, false).await;
        let outcome = service.submit(&valid_profile("jane@x.com")).await;

        let SubmitOutcome::Created {
            record,
            confirmation_sent,
        } = outcome
        else {
            panic!("expected Created");
        };
        assert!(confirmation_sent);
        assert_eq!(record.email(), "jane@x.com");
        assert_eq!(records.creates.load(Ordering::SeqCst), 1);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "jane@x.com");
        assert_eq!(sent[0].1, "Form Submission Confirmation");
        assert!(sent[0].2.contains("Jane"));
    }

    #[tokio::test]
    async fn missing_last_name_writes_and_sends_nothing() {
        let (service, records, notifier) = service(false, false).await;
        let mut profile = valid_profile("jane@x.com");
        profile.last_name.clear();

        match service.submit(&profile).await {
            SubmitOutcome::Invalid(errors) => assert!(errors.contains("lastName")),
            other => panic!("expected Invalid, got {other:?}"),
        }
        assert_eq!(records.creates.load(Ordering::SeqCst), 0);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_without_notification() {
        let (service, _records, notifier) = service(false, false).await;
        assert!(service.submit(&valid_profile("a@x.com")).await.is_created());

        let mut second = valid_profile("a@x.com");
        second.first_name = "Other".into();
        second.interests = vec!["go".into(), "sailing".into()];
        assert_eq!(service.submit(&second).await, SubmitOutcome::Conflict);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn storage_failure_is_reported_without_notification() {
        let (service, _records, notifier) = service(true, false).await;
        assert_eq!(
            service.submit(&valid_profile("jane@x.com")).await,
            SubmitOutcome::Failed
        );
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_confirmation_keeps_the_record() {
        let (service, records, _notifier) = service(false, true).await;
        match service.submit(&valid_profile("jane@x.com")).await {
            SubmitOutcome::Created {
                confirmation_sent, ..
            } => assert!(!confirmation_sent),
            other => panic!("expected Created, got {other:?}"),
        }
        assert!(records.find_by_email("jane@x.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn json_body_is_parsed_then_committed() {
        let (service, _records, _notifier) = service(false, false).await;
        let body = json!({
            "firstName": "Jane",
            "lastName": "Doe",
            "email": "jane@x.com",
            "phone": "+15551234567",
            "street": "", "city": "", "state": "", "postalCode": "", "country": "",
            "website": "",
        });
        match service.submit_json(&body).await {
            SubmitOutcome::Created { record, .. } => assert!(record.profile.website.is_none()),
            other => panic!("expected Created, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn json_body_errors_are_collected() {
        let (service, records, _notifier) = service(false, false).await;
        let body = json!({
            "firstName": "Jane",
            "email": "not-an-email",
            "phone": "+15551234567",
            "skills": [{"name": "Go", "level": "wizard"}],
        });
        match service.submit_json(&body).await {
            SubmitOutcome::Invalid(errors) => {
                assert!(errors.contains("lastName"));
                assert!(errors.contains("email"));
                assert!(errors.contains("skills.0.level"));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
        assert_eq!(records.creates.load(Ordering::SeqCst), 0);
    }
}

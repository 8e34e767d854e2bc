//! Submission: the commit protocol, its notifier collaborator, and the
//! REST surface for one-shot submissions.

pub mod notify;
pub mod protocol;
pub mod routes;

pub use notify::{CONFIRMATION_SUBJECT, LogNotifier, Notifier, SmtpNotifier};
pub use protocol::{SubmissionService, SubmitOutcome};
pub use routes::submission_routes;

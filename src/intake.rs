use thiserror::Error;

use crate::error::StoreError;
use crate::models::collection::FieldErrors;
use crate::models::submission::{NewSubmission, Submission, SubmissionKind};
use crate::notify::{AdminEvent, Notifier};
use crate::store::Store;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("请检查表单中标记的字段")]
    Invalid(FieldErrors),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Accepts a public contact message or franchise application: normalize,
/// validate, insert, then tell the admin badges. The store refuses a second
/// franchise application from the same email inside the duplicate window.
pub fn submit(
    store: &dyn Store,
    notifier: &Notifier,
    kind: SubmissionKind,
    raw: &NewSubmission,
) -> Result<Submission, IntakeError> {
    let form = raw.normalized();
    form.validate(kind).map_err(IntakeError::Invalid)?;

    let created = store.submission_create(kind, &form)?;
    log::info!("New {} #{} received", kind.table(), created.id);
    notifier.publish(AdminEvent::SubmissionCreated(kind));
    Ok(created)
}

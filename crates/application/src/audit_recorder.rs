use serde::Serialize;
use skyscraper_core::{AppError, AppResult};
use skyscraper_domain::{AuditLogRecord, AuditResourceType, Caller};

use crate::{NewAuditLogRecord, UnitOfWork};

/// Writes audit records through the caller's open unit of work.
///
/// Must run after the mutation it documents and before commit. Any failure is
/// reported as [`AppError::Audit`] and the enclosing unit must roll back.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditRecorder;

impl AuditRecorder {
    /// Creates an audit recorder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Serializes `payload` and appends the audit record inside `unit_of_work`.
    pub async fn record<P>(
        &self,
        unit_of_work: &mut dyn UnitOfWork,
        actor: &Caller,
        resource_type: AuditResourceType,
        resource_id: String,
        payload: &P,
    ) -> AppResult<AuditLogRecord>
    where
        P: Serialize + Sync + ?Sized,
    {
        let payload = serde_json::to_value(payload).map_err(|error| {
            AppError::Audit(format!(
                "failed to serialize audit payload for {} '{resource_id}': {error}",
                resource_type.as_str()
            ))
        })?;

        unit_of_work
            .insert_audit_record(NewAuditLogRecord {
                resource_type,
                resource_id,
                actor: *actor,
                payload,
            })
            .await
            .map_err(|error| match error {
                AppError::Audit(_) => error,
                other => AppError::Audit(format!("failed to insert audit record: {other}")),
            })
    }
}

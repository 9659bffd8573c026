//! Builds an [`IngestEvent`] from the S3 notification that invoked the
//! function. Only the first record is considered, and its bucket is checked
//! before anything else in it is read.

use aws_lambda_events::event::s3::S3Event;
use ingest_core::IngestEvent;
use tracing::instrument;

/// Why a notification could not be turned into an event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriggerError {
    #[error("notification carries no records")]
    NoRecords,
    #[error("record is missing {0}")]
    MissingField(&'static str),
}

/// What the first record of a notification asks the relay to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Ingest(IngestEvent),
    /// The record names another bucket, or none at all.
    ForeignBucket(Option<String>),
}

#[instrument(skip(event), fields(records = event.records.len()))]
pub fn trigger_from_notification(
    event: &S3Event,
    target_bucket: &str,
) -> Result<Trigger, TriggerError> {
    let record = event.records.first().ok_or(TriggerError::NoRecords)?;

    if event.records.len() > 1 {
        tracing::warn!(
            ignored = event.records.len() - 1,
            "Notification has more than one record; only the first is processed"
        );
    }

    let bucket = match record.s3.bucket.name.as_deref() {
        Some(name) if name == target_bucket => name,
        other => return Ok(Trigger::ForeignBucket(other.map(str::to_string))),
    };
    let key = record
        .s3
        .object
        .key
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(TriggerError::MissingField("s3.object.key"))?;
    let fingerprint = record
        .s3
        .object
        .e_tag
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(TriggerError::MissingField("s3.object.eTag"))?;

    Ok(Trigger::Ingest(IngestEvent::new(bucket, key, fingerprint)))
}

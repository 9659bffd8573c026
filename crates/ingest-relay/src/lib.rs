//! Ingest Relay
//!
//! Moves a newly created S3 object into the catalog asset whose name matches
//! the object's file stem. The pipeline lives in [`orchestrator`]; the
//! Lambda wiring in [`handler`].

pub mod handler;
pub mod negotiate;
pub mod orchestrator;
pub mod telemetry;
pub mod trigger;
pub mod upload;

pub use handler::{handle_notification, verify_catalog_credentials, AppState};
pub use negotiate::{NegotiatedUpload, UploadNegotiator};
pub use orchestrator::{Disposition, PipelineComponents, SkipReason, TransferOrchestrator};
pub use trigger::{trigger_from_notification, Trigger, TriggerError};

//! CRM lead submission client.
//!
//! Forwards a lead record to a CRM integration endpoint with a single
//! HTTP POST and interprets the JSON response.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `diagnostics`: Observer hook for submission notifications.
//! - `errors`: Error handling types.
//! - `models`: Lead records, wire payloads and submission outcomes.
//! - `submitter`: The CRM client.

pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod models;
pub mod submitter;

pub use config::SubmitterConfig;
pub use diagnostics::{SubmissionObserver, TracingObserver};
pub use errors::SubmitError;
pub use models::{FailureKind, LeadPayload, LeadRecord, SubmissionOutcome};
pub use submitter::LeadSubmitter;

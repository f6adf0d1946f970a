//! Diagnostic hook for lead submissions.
//!
//! Notifications are informational only; callers branch on the returned
//! `SubmissionOutcome`, never on what gets logged here.

use crate::errors::SubmitError;

/// Receives notifications from `LeadSubmitter`.
pub trait SubmissionObserver: Send + Sync {
    /// The CRM accepted the lead.
    fn lead_accepted(&self, lead_id: &str);

    /// The CRM matched the lead to an existing record. Follows `lead_accepted`.
    fn duplicate_detected(&self, lead_id: &str);

    /// The CRM answered with a non-200 status.
    fn lead_rejected(&self, status: u16, message: &str);

    /// The request could not complete, or a 200 body could not be read.
    fn submission_failed(&self, error: &SubmitError);
}

/// Default observer, emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SubmissionObserver for TracingObserver {
    fn lead_accepted(&self, lead_id: &str) {
        tracing::info!("✅ Lead submitted successfully: {}", lead_id);
    }

    fn duplicate_detected(&self, lead_id: &str) {
        tracing::warn!("⚠️  Lead {} is a duplicate of an existing lead", lead_id);
    }

    fn lead_rejected(&self, status: u16, message: &str) {
        tracing::error!("❌ CRM rejected lead ({}): {}", status, message);
    }

    fn submission_failed(&self, error: &SubmitError) {
        if error.is_transport() {
            tracing::error!("❌ Connection error: {}", error);
        } else {
            tracing::error!("❌ Lead submission failed: {}", error);
        }
    }
}

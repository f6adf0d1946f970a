use std::sync::Arc;

use crate::config::SubmitterConfig;
use crate::diagnostics::{SubmissionObserver, TracingObserver};
use crate::errors::SubmitError;
use crate::models::{CrmResponse, FailureKind, LeadPayload, LeadRecord, SubmissionOutcome};

/// Header carrying the integration API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Client that forwards leads to the CRM integration endpoint.
///
/// Each call to `submit` makes exactly one POST, with no retries.
#[derive(Clone)]
pub struct LeadSubmitter {
    client: reqwest::Client,
    endpoint_url: String,
    api_key: String,
    partner_id: String,
    observer: Arc<dyn SubmissionObserver>,
}

impl LeadSubmitter {
    /// Creates a new `LeadSubmitter` that reports through `tracing`.
    ///
    /// # Arguments
    ///
    /// * `config` - Endpoint, API key, partner identifier and timeout.
    pub fn new(config: SubmitterConfig) -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SubmitError::Config(format!("Failed to create CRM client: {}", e)))?;

        Ok(Self {
            client,
            endpoint_url: config.endpoint_url,
            api_key: config.api_key,
            partner_id: config.partner_id,
            observer: Arc::new(TracingObserver),
        })
    }

    /// Replaces the diagnostic observer.
    pub fn with_observer(mut self, observer: Arc<dyn SubmissionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn partner_id(&self) -> &str {
        &self.partner_id
    }

    /// Submits a lead to the CRM.
    ///
    /// Never fails: transport errors, rejections and unreadable responses all
    /// come back as `SubmissionOutcome::Failed`.
    ///
    /// # Arguments
    ///
    /// * `lead` - The lead to forward. Missing optional fields are defaulted.
    pub async fn submit(&self, lead: &LeadRecord) -> SubmissionOutcome {
        let payload = LeadPayload::from_record(lead, &self.partner_id);
        tracing::info!("Submitting lead to CRM ({})", contact_summary(lead));
        tracing::debug!("Lead name: {}", lead.name);

        let response = match self.post_payload(&payload).await {
            Ok(response) => response,
            Err(e) => {
                self.observer.submission_failed(&e);
                return SubmissionOutcome::from_error(&e);
            }
        };

        let outcome = SubmissionOutcome::from_response(&response);
        match &outcome {
            SubmissionOutcome::Accepted {
                lead_id,
                is_duplicate,
            } => {
                self.observer.lead_accepted(lead_id);
                if *is_duplicate {
                    self.observer.duplicate_detected(lead_id);
                }
            }
            SubmissionOutcome::Failed {
                kind: FailureKind::RemoteRejection { status },
                error,
            } => {
                self.observer.lead_rejected(*status, error);
            }
            SubmissionOutcome::Failed { error, .. } => {
                tracing::debug!("Unreadable CRM response body: {}", response.body);
                self.observer
                    .submission_failed(&SubmitError::MalformedResponse(error.clone()));
            }
        }

        outcome
    }

    /// Submits leads one at a time, in order. Each lead gets its own request.
    pub async fn submit_all(&self, leads: &[LeadRecord]) -> Vec<SubmissionOutcome> {
        let mut outcomes = Vec::with_capacity(leads.len());
        for lead in leads {
            outcomes.push(self.submit(lead).await);
        }

        let accepted = outcomes.iter().filter(|o| o.is_success()).count();
        tracing::info!(
            "Submitted {} leads: {} accepted, {} failed",
            outcomes.len(),
            accepted,
            outcomes.len() - accepted
        );
        outcomes
    }

    /// Posts a payload and returns the raw response, whatever its status.
    ///
    /// # Returns
    ///
    /// * `Result<CrmResponse, SubmitError>` - The status and body, or a
    ///   classified transport error.
    pub async fn post_payload(&self, payload: &LeadPayload) -> Result<CrmResponse, SubmitError> {
        tracing::debug!("POST {}", self.endpoint_url);

        let response = self
            .client
            .post(&self.endpoint_url)
            .header("Content-Type", "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::debug!("CRM responded with status {}", status);

        Ok(CrmResponse { status, body })
    }
}

/// Describes which optional contact fields a lead carries, without their values.
fn contact_summary(lead: &LeadRecord) -> String {
    let presence = |value: &Option<String>| if value.is_some() { "provided" } else { "missing" };
    format!(
        "email: {}, location: {}",
        presence(&lead.email),
        presence(&lead.location)
    )
}

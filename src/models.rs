use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::errors::SubmitError;

/// Sent as `email` when the lead has none.
pub const NO_EMAIL: &str = "No Email";
/// Sent as `sourceDescription` when the lead has no location.
pub const NO_LOCATION: &str = "No Location";

/// A prospective-customer contact record, as supplied by the caller.
///
/// Nothing here is validated; the CRM decides what it accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LeadRecord {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Ignored on submission; the partner identifier is always sent instead.
    #[serde(default)]
    pub utm_source: Option<String>,
    #[serde(default)]
    pub utm_medium: Option<String>,
    #[serde(default)]
    pub utm_campaign: Option<String>,
    #[serde(default)]
    pub utm_content: Option<String>,
    #[serde(default)]
    pub utm_term: Option<String>,
}

impl LeadRecord {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_utm_source(mut self, source: impl Into<String>) -> Self {
        self.utm_source = Some(source.into());
        self
    }

    pub fn with_utm_medium(mut self, medium: impl Into<String>) -> Self {
        self.utm_medium = Some(medium.into());
        self
    }

    pub fn with_utm_campaign(mut self, campaign: impl Into<String>) -> Self {
        self.utm_campaign = Some(campaign.into());
        self
    }

    pub fn with_utm_content(mut self, content: impl Into<String>) -> Self {
        self.utm_content = Some(content.into());
        self
    }

    pub fn with_utm_term(mut self, term: impl Into<String>) -> Self {
        self.utm_term = Some(term.into());
        self
    }
}

/// Flat JSON body posted to the CRM integration endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadPayload {
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(rename = "sourceDescription")]
    pub source_description: String,
    pub utm_source: String,
    pub utm_medium: String,
    pub utm_campaign: String,
    pub utm_content: String,
    pub utm_term: String,
}

impl LeadPayload {
    /// Maps a lead onto the wire format, filling in defaults.
    ///
    /// `utm_source` is always `partner_id`, whatever the record carries.
    pub fn from_record(lead: &LeadRecord, partner_id: &str) -> Self {
        let or_empty = |value: &Option<String>| value.clone().unwrap_or_default();

        Self {
            name: lead.name.clone(),
            phone: lead.phone.clone(),
            email: lead.email.clone().unwrap_or_else(|| NO_EMAIL.to_string()),
            source_description: lead
                .location
                .clone()
                .unwrap_or_else(|| NO_LOCATION.to_string()),
            utm_source: partner_id.to_string(),
            utm_medium: or_empty(&lead.utm_medium),
            utm_campaign: or_empty(&lead.utm_campaign),
            utm_content: or_empty(&lead.utm_content),
            utm_term: or_empty(&lead.utm_term),
        }
    }
}

/// Raw response received from the CRM, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmResponse {
    pub status: u16,
    pub body: String,
}

/// Body of a 200 response.
#[derive(Debug, Deserialize)]
struct AcceptedBody {
    #[serde(rename = "leadId", default)]
    lead_id: Option<Value>,
    #[serde(rename = "isDuplicate", default)]
    is_duplicate: Option<bool>,
}

/// Body of any other response.
#[derive(Debug, Deserialize)]
struct RejectedBody {
    #[serde(default)]
    message: Option<Value>,
}

/// Why a submission failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The CRM answered with a non-200 status.
    RemoteRejection { status: u16 },
    Timeout,
    Connection,
    Transport,
    /// The CRM answered 200 with a body that could not be read.
    MalformedResponse,
}

impl From<&SubmitError> for FailureKind {
    fn from(err: &SubmitError) -> Self {
        match err {
            SubmitError::Timeout(_) => FailureKind::Timeout,
            SubmitError::Connection(_) => FailureKind::Connection,
            SubmitError::MalformedResponse(_) => FailureKind::MalformedResponse,
            SubmitError::Transport(_) | SubmitError::Config(_) => FailureKind::Transport,
        }
    }
}

/// Result of a single lead submission.
///
/// Serializes to `{"success":true,"leadId":..,"isDuplicate":..}` or
/// `{"success":false,"error":..}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted { lead_id: String, is_duplicate: bool },
    Failed { kind: FailureKind, error: String },
}

impl SubmissionOutcome {
    /// Interprets a received response by its status code.
    pub fn from_response(response: &CrmResponse) -> Self {
        if response.status == 200 {
            Self::from_accepted_body(&response.body)
        } else {
            Self::from_rejected_body(response.status, &response.body)
        }
    }

    fn from_accepted_body(body: &str) -> Self {
        let parsed: AcceptedBody = match serde_json::from_str(body) {
            Ok(parsed) => parsed,
            Err(e) => {
                return Self::from_error(&SubmitError::MalformedResponse(format!(
                    "response body is not valid JSON: {}",
                    e
                )))
            }
        };

        let lead_id = match parsed.lead_id {
            Some(Value::String(id)) => id,
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                return Self::from_error(&SubmitError::MalformedResponse(
                    "response missing 'leadId' field".to_string(),
                ))
            }
        };

        SubmissionOutcome::Accepted {
            lead_id,
            is_duplicate: parsed.is_duplicate.unwrap_or(false),
        }
    }

    fn from_rejected_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<RejectedBody>(body)
            .ok()
            .and_then(|parsed| parsed.message)
            .and_then(|message| match message {
                Value::Null => None,
                Value::String(text) => Some(text),
                other => Some(other.to_string()),
            });

        SubmissionOutcome::Failed {
            kind: FailureKind::RemoteRejection { status },
            error: message.unwrap_or_else(|| format!("CRM returned {}", status)),
        }
    }

    /// Converts an error from the HTTP boundary into a failed outcome.
    pub fn from_error(err: &SubmitError) -> Self {
        SubmissionOutcome::Failed {
            kind: FailureKind::from(err),
            error: err.message().to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Accepted { .. })
    }

    pub fn lead_id(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Accepted { lead_id, .. } => Some(lead_id),
            SubmissionOutcome::Failed { .. } => None,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            SubmissionOutcome::Accepted {
                is_duplicate: true,
                ..
            }
        )
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Accepted { .. } => None,
            SubmissionOutcome::Failed { error, .. } => Some(error),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            SubmissionOutcome::Accepted { .. } => None,
            SubmissionOutcome::Failed { kind, .. } => Some(*kind),
        }
    }
}

impl Serialize for SubmissionOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SubmissionOutcome::Accepted {
                lead_id,
                is_duplicate,
            } => {
                let mut state = serializer.serialize_struct("SubmissionOutcome", 3)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("leadId", lead_id)?;
                state.serialize_field("isDuplicate", is_duplicate)?;
                state.end()
            }
            SubmissionOutcome::Failed { error, .. } => {
                let mut state = serializer.serialize_struct("SubmissionOutcome", 2)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
                state.end()
            }
        }
    }
}

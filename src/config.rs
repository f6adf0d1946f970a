use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Default request timeout, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Deployment configuration for `LeadSubmitter`.
#[derive(Clone, Deserialize)]
pub struct SubmitterConfig {
    /// Integration endpoint that receives the POST.
    pub endpoint_url: String,
    /// Sent as the `X-API-Key` header.
    pub api_key: String,
    /// Fixed partner identifier, always sent as `utm_source`.
    pub partner_id: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl SubmitterConfig {
    /// Builds a validated config with the default 30 second timeout.
    pub fn new(
        endpoint_url: impl Into<String>,
        api_key: impl Into<String>,
        partner_id: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let config = Self {
            endpoint_url: endpoint_url.into(),
            api_key: api_key.into(),
            partner_id: partner_id.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        };
        config.validate()?;
        Ok(config)
    }

    /// Overrides the request timeout. Sub-millisecond values round up to 1ms.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = (timeout.as_millis() as u64).max(1);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Loads configuration from the process environment, reading `.env` first.
    ///
    /// Recognized variables: `CRM_API_URL`, `CRM_API_KEY`, `CRM_PARTNER_ID`
    /// and the optional `CRM_TIMEOUT_MS`.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("CRM API URL: {}", config.endpoint_url);
        tracing::debug!("Partner ID: {}", config.partner_id);
        tracing::debug!("Request timeout: {}ms", config.timeout_ms);

        Ok(config)
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> anyhow::Result<String> {
            let value =
                lookup(key).ok_or_else(|| anyhow::anyhow!("{} environment variable required", key))?;
            if value.trim().is_empty() {
                anyhow::bail!("{} cannot be empty", key);
            }
            Ok(value)
        };

        let config = Self {
            endpoint_url: required("CRM_API_URL")?,
            api_key: required("CRM_API_KEY")?,
            partner_id: required("CRM_PARTNER_ID")?,
            timeout_ms: match lookup("CRM_TIMEOUT_MS").filter(|s| !s.trim().is_empty()) {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    anyhow::anyhow!("CRM_TIMEOUT_MS must be a positive number of milliseconds")
                })?,
                None => DEFAULT_TIMEOUT_MS,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !self.endpoint_url.starts_with("http://") && !self.endpoint_url.starts_with("https://")
        {
            anyhow::bail!("CRM_API_URL must start with http:// or https://");
        }
        url::Url::parse(&self.endpoint_url)
            .map_err(|e| anyhow::anyhow!("CRM_API_URL is not a valid URL: {}", e))?;
        if self.api_key.trim().is_empty() {
            anyhow::bail!("CRM_API_KEY cannot be empty");
        }
        if self.partner_id.trim().is_empty() {
            anyhow::bail!("CRM_PARTNER_ID cannot be empty");
        }
        if self.timeout_ms == 0 {
            anyhow::bail!("CRM_TIMEOUT_MS must be greater than zero");
        }
        Ok(())
    }
}

// The API key never ends up in logs.
impl fmt::Debug for SubmitterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmitterConfig")
            .field("endpoint_url", &self.endpoint_url)
            .field("api_key", &"[REDACTED]")
            .field("partner_id", &self.partner_id)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_lookup_defaults_timeout() {
        let vars = env(&[
            ("CRM_API_URL", "https://crm.example.com/api/integration"),
            ("CRM_API_KEY", "secret"),
            ("CRM_PARTNER_ID", "acme_partner"),
        ]);
        let config = SubmitterConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.endpoint_url, "https://crm.example.com/api/integration");
        assert_eq!(config.partner_id, "acme_partner");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_from_lookup_custom_timeout() {
        let vars = env(&[
            ("CRM_API_URL", "http://localhost:8080/leads"),
            ("CRM_API_KEY", "secret"),
            ("CRM_PARTNER_ID", "acme_partner"),
            ("CRM_TIMEOUT_MS", "1500"),
        ]);
        let config = SubmitterConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn test_with_timeout_never_zero() {
        let config = SubmitterConfig::new("https://crm.example.com", "key", "acme")
            .unwrap()
            .with_timeout(Duration::from_micros(500));
        assert_eq!(config.timeout_ms, 1);
        assert!(config.validate().is_ok());

        let config = config.with_timeout(Duration::ZERO);
        assert_eq!(config.timeout(), Duration::from_millis(1));

        let config = config.with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout_ms, 5000);
    }

    #[test]
    fn test_missing_or_invalid_values_rejected() {
        let missing_key = env(&[
            ("CRM_API_URL", "https://crm.example.com"),
            ("CRM_PARTNER_ID", "acme_partner"),
        ]);
        let err = SubmitterConfig::from_lookup(|k| missing_key.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("CRM_API_KEY"));

        let bad_url = env(&[
            ("CRM_API_URL", "ftp://crm.example.com"),
            ("CRM_API_KEY", "secret"),
            ("CRM_PARTNER_ID", "acme_partner"),
        ]);
        assert!(SubmitterConfig::from_lookup(|k| bad_url.get(k).cloned()).is_err());

        let bad_timeout = env(&[
            ("CRM_API_URL", "https://crm.example.com"),
            ("CRM_API_KEY", "secret"),
            ("CRM_PARTNER_ID", "acme_partner"),
            ("CRM_TIMEOUT_MS", "soon"),
        ]);
        assert!(SubmitterConfig::from_lookup(|k| bad_timeout.get(k).cloned()).is_err());

        assert!(SubmitterConfig::new("https://crm.example.com", "  ", "acme").is_err());
        assert!(SubmitterConfig::new("https://crm.example.com", "key", "").is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = SubmitterConfig::new("https://crm.example.com", "super-secret", "acme").unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("[REDACTED]"));
    }
}

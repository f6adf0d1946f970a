use crm_lead_client::{LeadRecord, LeadSubmitter, SubmitterConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Lead submitted when no file is given on the command line.
fn example_lead() -> LeadRecord {
    LeadRecord::new("Ivan Petrenko", "+380501234567")
        .with_email("ivan@example.com")
        .with_location("Kyiv, Ukraine")
}

/// Reads the leads to submit from a JSON file: either one object or an array.
async fn load_leads(path: &str) -> anyhow::Result<Vec<LeadRecord>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("{} is not valid JSON: {}", path, e))?;

    let leads = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    Ok(leads)
}

/// Submits the example lead, or the leads in the JSON file passed as the
/// first argument, and prints each outcome as JSON.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crm_lead_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SubmitterConfig::from_env()?;
    let submitter = LeadSubmitter::new(config)?;

    let leads = match std::env::args().nth(1) {
        Some(path) => load_leads(&path).await?,
        None => vec![example_lead()],
    };

    for outcome in submitter.submit_all(&leads).await {
        match (outcome.lead_id(), outcome.error()) {
            (Some(lead_id), _) => tracing::info!("Lead created with ID: {}", lead_id),
            (None, Some(error)) => tracing::warn!("Lead not created: {}", error),
            (None, None) => {}
        }
        println!("{}", serde_json::to_string(&outcome)?);
    }

    Ok(())
}

//! Wires configuration, credentials, the Gemini gateway and the workflow.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use vogue_application::StylingWorkflow;
use vogue_core::WorkflowEvent;
use vogue_core::config::AppConfig;
use vogue_core::secret::SecretService;
use vogue_infrastructure::{ConfigService, SecretServiceImpl, VoguePaths};
use vogue_interaction::GeminiStylingGateway;

pub struct App {
    pub config: AppConfig,
    pub workflow: Arc<StylingWorkflow>,
    pub events: UnboundedReceiver<WorkflowEvent>,
}

pub async fn bootstrap(paths: &VoguePaths) -> Result<App> {
    let config = ConfigService::new(paths.clone())
        .get_config()
        .context("Failed to load config.toml")?;

    let secrets = SecretServiceImpl::new(paths.clone())
        .load_secrets()
        .await
        .context("Failed to load API credentials")?;

    let api_key = secrets.gemini_api_key().ok_or_else(|| {
        let location = paths
            .secret_file()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|_| "secret.json".to_string());
        anyhow!("No Gemini API key found. Set GEMINI_API_KEY or add it to {location}")
    })?;

    let mut gateway = GeminiStylingGateway::from_config(api_key, &config)
        .context("Failed to create Gemini client")?;
    if let Some(model) = secrets.gemini.as_ref().and_then(|g| g.model_name.clone()) {
        gateway = gateway.with_text_model(model);
    }

    tracing::info!(
        text_model = gateway.text_model(),
        image_model = gateway.image_model(),
        "[Bootstrap] gateway ready"
    );

    let (tx, rx) = unbounded_channel();
    let workflow = StylingWorkflow::new(Arc::new(gateway)).with_events(tx);

    Ok(App {
        config,
        workflow: Arc::new(workflow),
        events: rx,
    })
}

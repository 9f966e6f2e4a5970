//! Builds the API client from command-line connection settings.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tokio::sync::broadcast;

use estatedesk_core::{ApiUrl, StaticNavigator};
use estatedesk_file::FileCredentialStore;
use estatedesk_http::{ApiClient, ClientConfig, SessionEvent};

use crate::cli::ConnectionArgs;
use crate::output;

/// Everything a command needs to talk to the API.
pub struct CliContext {
    pub client: ApiClient,
    pub store: FileCredentialStore,
    events: broadcast::Receiver<SessionEvent>,
}

impl CliContext {
    pub fn new(args: &ConnectionArgs) -> Result<Self> {
        let api_url = ApiUrl::new(&args.api).context("Invalid API URL")?;
        let store = FileCredentialStore::new(credential_path(args)?);

        let renewal_timeout = match args.renewal_timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let config = ClientConfig::new(api_url)
            .with_renewal_timeout(renewal_timeout)
            .with_user_agent(concat!("estatedesk-cli/", env!("ESTATEDESK_VERSION")));

        let client = ApiClient::builder(config)
            .credential_store(Arc::new(store.clone()))
            .navigator(Arc::new(StaticNavigator::new(args.route.as_str())))
            .build()
            .context("Failed to build API client")?;
        let events = client.subscribe();

        Ok(Self {
            client,
            store,
            events,
        })
    }

    /// Report session events raised while the command ran.
    pub fn report_session_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                SessionEvent::Renewed => tracing::info!("Session renewed"),
                SessionEvent::Expired => {
                    output::error("Session expired. Run 'estatedesk login' to sign in again.")
                }
            }
        }
    }
}

/// Get the credential file path.
fn credential_path(args: &ConnectionArgs) -> Result<PathBuf> {
    if let Some(path) = &args.credentials {
        return Ok(path.clone());
    }

    let dirs =
        ProjectDirs::from("", "", "estatedesk").context("Could not determine data directory")?;
    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("credential.json"))
}

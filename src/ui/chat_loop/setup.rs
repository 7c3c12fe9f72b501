use std::error::Error;
use std::time::Duration;

use tracing::{debug, warn};

use crate::api::models::fetch_models;
use crate::core::app::{App, AppInit};
use crate::core::config::data::Config;
use crate::core::store::SessionStore;
use crate::utils::url::resolve_host;

/// Environment variable consulted when no host is given or stored.
pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Startup options taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// Preferred model; falls back to the remembered one.
    pub model: Option<String>,
    pub host: Option<String>,
    pub log: Option<String>,
}

pub fn open_session_store(config: &Config) -> Result<SessionStore, Box<dyn Error>> {
    let path = config
        .sessions_path()
        .ok_or("Could not determine a data directory for saved chats")?;
    Ok(SessionStore::open_file(path))
}

/// Resolve the server address, reading the stored `host-address` once.
pub fn resolve_startup_host(cli_host: Option<&str>, store: &SessionStore) -> String {
    let stored = match store.host_address() {
        Ok(host) => host,
        Err(err) => {
            warn!(error = %err, "Could not read the stored host address");
            None
        }
    };
    let env = std::env::var(OLLAMA_HOST_ENV).ok();
    resolve_host(cli_host, stored.as_deref(), env.as_deref())
}

pub fn build_http_client() -> Result<reqwest::Client, Box<dyn Error>> {
    let client = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?;
    Ok(client)
}

/// Build the application state for the chat loop and load the model listing.
///
/// A failed listing does not abort startup: the app opens with the
/// diagnostic dialog so the user can fix the host from inside the UI.
pub async fn bootstrap_app(options: ChatOptions) -> Result<App, Box<dyn Error>> {
    let config = Config::load()?;
    let store = open_session_store(&config)?;
    let host = resolve_startup_host(options.host.as_deref(), &store);
    let requested = options
        .model
        .filter(|model| !model.trim().is_empty())
        .or(config.last_model.clone());

    let mut app = App::new(AppInit {
        client: build_http_client()?,
        host,
        store,
        markdown_enabled: config.markdown_enabled(),
        log_file: options.log,
    })?;

    debug!(host = %app.host, requested = ?requested, "Loading model listing");
    let listing = fetch_models(&app.client, &app.host).await;
    app.apply_model_listing(listing, requested.as_deref());
    Ok(app)
}

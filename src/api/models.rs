use crate::api::{ModelInfo, ModelsResponse};
use crate::core::error::TransportError;
use crate::utils::url::construct_api_url;

pub async fn fetch_models(
    client: &reqwest::Client,
    host: &str,
) -> Result<ModelsResponse, TransportError> {
    let models_url = construct_api_url(host, "api/tags");
    let response = client.get(models_url).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let models_response = response.json::<ModelsResponse>().await?;
    Ok(models_response)
}

pub fn sort_models(models: &mut [ModelInfo]) {
    models.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
}

/// Pick the active model from the listing.
///
/// The requested model wins when the server knows it; otherwise the first
/// listed model is used. Returns `None` only when the listing is empty.
pub fn select_model(models: &[ModelInfo], requested: Option<&str>) -> Option<String> {
    if let Some(requested) = requested.filter(|name| !name.is_empty()) {
        if models.iter().any(|model| model.name == requested) {
            return Some(requested.to_string());
        }
    }
    models.first().map(|model| model.name.clone())
}

/// Markdown body of the dialog shown when the model listing cannot be loaded.
pub fn directory_failure_help(host: &str, error: &TransportError) -> String {
    format!(
        "llm-chat was unable to communicate with the model server at {host} due to the following error:\n\n\
```\n{error}\n```\n\n\
---\n\n\
**How can I expose the Ollama server?**\n\n\
By default, Ollama listens on `127.0.0.1:11434`. Make sure `ollama serve` is running, or point \
llm-chat at another address with `--host`, `/host <url>` or the `OLLAMA_HOST` environment variable.\n\n\
If the server sits behind a proxy that checks origins, allow this client through `OLLAMA_ORIGINS`:\n\n\
```\nOLLAMA_ORIGINS=* ollama serve\n```\n\n\
Also see: https://github.com/ollama/ollama/blob/main/docs/faq.md"
    )
}

/// Human-readable model size, e.g. `3.6 GB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

use base64::Engine;
use serde_json::Value;

/// The search proxy expects every free-text parameter base64-encoded
/// (standard alphabet, padded); URL escaping is left to the query builder.
pub fn encode_param(text: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(text.as_bytes())
}

async fn get(client: &reqwest::Client, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response, String> {
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| format!("Request to {} failed: {}", url, e))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let body = body.chars().take(300).collect::<String>();
        return Err(format!("HTTP error {} from {}: {}", status, url, body));
    }

    Ok(response)
}

pub async fn get_json(client: &reqwest::Client, url: &str, query: &[(&str, &str)]) -> Result<Value, String> {
    get(client, url, query)
        .await?
        .json::<Value>()
        .await
        .map_err(|e| format!("Invalid JSON from {}: {}", url, e))
}

pub async fn get_text(client: &reqwest::Client, url: &str, query: &[(&str, &str)]) -> Result<String, String> {
    get(client, url, query)
        .await?
        .text()
        .await
        .map_err(|e| format!("Failed to read response from {}: {}", url, e))
}

pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

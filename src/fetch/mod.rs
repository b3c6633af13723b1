mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{anyhow, Result};

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    if !resp.status().is_success() {
        return Err(anyhow!("GET {url} returned status {}", resp.status()));
    }
    Ok(resp.bytes().await?.to_vec())
}

/// Fetches a URL and parses the body as JSON.
pub async fn fetch_json<C: HttpClient>(client: &C, url: &str) -> Result<serde_json::Value> {
    let bytes = fetch_bytes(client, url).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

//! Thin HTTP client for JSON APIs and file downloads.

use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client shared by the source fetchers.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a client identifying itself as this tool.
    pub fn with_user_agent() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("repobuild/", env!("REPOBUILD_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::new(client))
    }

    /// Performs a GET request with query parameters and deserializes the JSON response.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!("GET JSON from {} with query {:?}...", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .context("Failed to send request")?
            .error_for_status()
            .with_context(|| format!("Request to {} failed", url))?;

        response
            .json::<T>()
            .await
            .context("Failed to parse JSON response")
    }

    /// Downloads a file into memory.
    #[tracing::instrument(skip(self))]
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Downloading {}...", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to start download request")?
            .error_for_status()
            .with_context(|| format!("Download of {} failed", url))?;

        let bytes = response
            .bytes()
            .await
            .context("Failed to read download body")?;

        debug!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_json_with_query_success() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/rpc/?v=5&type=info")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"["item1", "item2"]"#)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result: Vec<String> = client
            .get_json_with_query(&format!("{}/rpc/", url), &[("v", "5"), ("type", "info")])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result, vec!["item1", "item2"]);
    }

    #[tokio::test]
    async fn test_get_json_server_error() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/rpc/")
            .with_status(503)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result: Result<serde_json::Value> =
            client.get_json_with_query(&format!("{}/rpc/", url), &[]).await;

        mock.assert_async().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_bytes() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/cgit/aur.git/snapshot/foo.tar.gz")
            .with_status(200)
            .with_body("test content")
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let bytes = client
            .get_bytes(&format!("{}/cgit/aur.git/snapshot/foo.tar.gz", url))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, b"test content");
    }

    #[tokio::test]
    async fn test_get_bytes_not_found() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/missing.tar.gz")
            .with_status(404)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result = client.get_bytes(&format!("{}/missing.tar.gz", url)).await;

        mock.assert_async().await;
        assert!(result.is_err());
    }
}

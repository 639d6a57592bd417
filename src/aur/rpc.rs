//! AUR RPC (v5) client.

use anyhow::{Result, anyhow};
use serde::Deserialize;

use crate::http::HttpClient;

/// Default AUR endpoint.
pub const DEFAULT_AUR_URL: &str = "https://aur.archlinux.org";

/// Package record returned by the `info` query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AurPackage {
    pub name: String,
    pub package_base: String,
    pub version: String,
    /// Snapshot tarball path relative to the AUR root.
    #[serde(rename = "URLPath")]
    pub url_path: String,
    #[serde(default)]
    pub depends: Vec<String>,
    #[serde(default)]
    pub make_depends: Vec<String>,
    #[serde(default)]
    pub check_depends: Vec<String>,
}

impl AurPackage {
    /// Dependencies needed to build this package.
    pub fn build_depends(&self) -> impl Iterator<Item = &str> {
        self.depends
            .iter()
            .chain(&self.make_depends)
            .chain(&self.check_depends)
            .map(String::as_str)
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Vec<AurPackage>,
}

/// Client for the AUR RPC interface.
#[derive(Clone)]
pub struct AurClient {
    http: HttpClient,
    base_url: String,
}

impl AurClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up packages by name. Unknown names are simply absent from the result.
    pub async fn info(&self, names: &[String]) -> Result<Vec<AurPackage>> {
        if names.is_empty() {
            return Ok(vec![]);
        }

        let mut query = vec![("v", "5"), ("type", "info")];
        query.extend(names.iter().map(|name| ("arg[]", name.as_str())));

        let url = format!("{}/rpc/", self.base_url);
        let response: RpcResponse = self.http.get_json_with_query(&url, &query).await?;

        if response.kind == "error" {
            return Err(anyhow!(
                "AUR RPC error: {}",
                response.error.unwrap_or_else(|| "unknown error".into())
            ));
        }

        Ok(response.results)
    }

    /// Download the snapshot tarball of a package base.
    pub async fn snapshot(&self, pkg: &AurPackage) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, pkg.url_path);
        self.http.get_bytes(&url).await
    }
}

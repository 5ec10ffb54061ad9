use serde::Deserialize;
use reqwest::Client;
use crate::version::VersionEntry;
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct VersionManifest {
    versions: Vec<VersionEntry>,
}

/// Каталог версий Mojang.
#[derive(Debug, Clone)]
pub struct RemoteCatalog {
    client: Client,
    manifest_url: String,
}

impl RemoteCatalog {
    pub fn new(client: Client, manifest_url: impl Into<String>) -> Self {
        Self {
            client,
            manifest_url: manifest_url.into(),
        }
    }

    /// Любая ошибка сети или формата превращается в `CatalogUnavailable`, повторов нет.
    pub async fn fetch(&self) -> Result<Vec<VersionEntry>> {
        log::info!("Загрузка каталога версий: {}", self.manifest_url);

        let body = self
            .client
            .get(&self.manifest_url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| Error::CatalogUnavailable(e.to_string()))?
            .text()
            .await
            .map_err(|e| Error::CatalogUnavailable(e.to_string()))?;

        let versions = parse_manifest(&body)?;
        log::info!("Каталог содержит {} версий", versions.len());
        Ok(versions)
    }
}

pub fn parse_manifest(body: &str) -> Result<Vec<VersionEntry>> {
    let manifest: VersionManifest = serde_json::from_str(body)
        .map_err(|e| Error::CatalogUnavailable(format!("malformed manifest: {}", e)))?;
    Ok(manifest
        .versions
        .into_iter()
        .filter(|entry| !entry.id.is_empty())
        .collect())
}

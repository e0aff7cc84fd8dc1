//! Upstream release fetcher.
//!
//! Looks up the latest release of the dataset repository, downloads the
//! dataset and its published checksum, and verifies one against the other.

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::config::GeneratorConfig;
use crate::{Error, Result};

/// Length of a hex-encoded SHA-256 digest.
const SHA256_HEX_LEN: usize = 64;

const USER_AGENT: &str = concat!("sing-geosite/", env!("CARGO_PKG_VERSION"));

/// A published release, as returned by the GitHub releases API.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub name: Option<String>,
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

impl Release {
    /// Display name, falling back to the tag.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.tag_name,
        }
    }

    /// Find an asset by exact name.
    pub fn find_asset(&self, name: &str) -> Result<&ReleaseAsset> {
        self.assets
            .iter()
            .find(|asset| asset.name == name)
            .ok_or_else(|| Error::AssetNotFound {
                asset: name.to_string(),
                release: self.display_name().to_string(),
            })
    }
}

/// Blocking client for release lookups and asset downloads.
pub struct ReleaseClient {
    client: reqwest::blocking::Client,
    api_base: String,
    token: Option<String>,
}

impl ReleaseClient {
    pub fn new(api_base: &str, token: Option<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Build a client from the generator configuration.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        Self::new(&config.api_base, config.github_token.clone())
    }

    /// Look up the latest release of `owner/repo`.
    pub fn latest_release(&self, owner: &str, repo: &str) -> Result<Release> {
        let url = format!("{}/repos/{}/{}/releases/latest", self.api_base, owner, repo);
        log::debug!("looking up latest release: {}", url);

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(ref token) = self.token {
            request = request.basic_auth(token, None::<&str>);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Release(format!("{}: HTTP {}", url, status)));
        }

        Ok(response.json()?)
    }

    /// Download an asset body.
    pub fn download(&self, url: &str) -> Result<Vec<u8>> {
        log::info!("downloading {}", url);

        let response = self.client.get(url).send()?.error_for_status()?;
        let data = response.bytes()?.to_vec();

        log::info!("downloaded {} bytes", data.len());
        Ok(data)
    }

    /// Fetch the latest dataset and verify it against its checksum asset.
    pub fn fetch_dataset(&self, config: &GeneratorConfig) -> Result<Vec<u8>> {
        let (owner, repo) = config.repository_parts()?;
        let release = self.latest_release(owner, repo)?;
        log::info!("latest release: {}", release.display_name());

        let dataset_asset = release.find_asset(&config.dataset_asset)?;
        let checksum_asset = release.find_asset(&config.checksum_asset)?;

        let data = self.download(&dataset_asset.browser_download_url)?;
        let checksum = self.download(&checksum_asset.browser_download_url)?;
        verify_checksum(&data, &String::from_utf8_lossy(&checksum))?;

        Ok(data)
    }
}

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Compare the digest of `data` with the first 64 characters of a
/// checksum file. Anything after the digest is ignored.
pub fn verify_checksum(data: &[u8], checksum_file: &str) -> Result<()> {
    let actual = sha256_hex(data);
    let expected = checksum_file.get(..SHA256_HEX_LEN).unwrap_or(checksum_file);

    if expected.len() != SHA256_HEX_LEN || expected != actual {
        return Err(Error::ChecksumMismatch {
            expected: expected.trim().to_string(),
            actual,
        });
    }

    log::debug!("checksum verified: {}", actual);
    Ok(())
}

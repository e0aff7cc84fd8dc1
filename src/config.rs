//! Generator configuration.

use std::path::PathBuf;

use crate::{Error, Result};

/// Upstream repository publishing `dlc.dat`.
pub const DEFAULT_REPOSITORY: &str = "v2fly/domain-list-community";

/// Dataset asset name in the upstream release.
pub const DEFAULT_DATASET_ASSET: &str = "dlc.dat";

/// Checksum asset name in the upstream release.
pub const DEFAULT_CHECKSUM_ASSET: &str = "dlc.dat.sha256sum";

/// Output directory, recreated on every run.
pub const DEFAULT_OUTPUT_DIR: &str = "sing-geosite";

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

pub const DEFAULT_RAW_LINK_BASE: &str =
    "https://raw.githubusercontent.com/yzxiu/singbox_ruleset/main/sing-geosite";

pub const DEFAULT_CDN_LINK_BASE: &str =
    "https://cdn.jsdelivr.net/gh/yzxiu/singbox_ruleset@main/sing-geosite";

/// Merged rule-set definitions, read from the working directory.
pub const DEFAULT_MERGE_CONFIG: &str = "merge_config.json";

/// Directory holding non-geosite rule sets referenced by merged sets.
pub const DEFAULT_RULE_DIR: &str = "rule";

pub const DEFAULT_REPO_RAW_BASE: &str =
    "https://raw.githubusercontent.com/yzxiu/singbox_ruleset/main";

pub const DEFAULT_REPO_CDN_BASE: &str = "https://cdn.jsdelivr.net/gh/yzxiu/singbox_ruleset@main";

/// Download link bases used in each category README.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Raw GitHub link base (`{base}/{code}/{code}.srs`)
    pub raw_base: String,
    /// CDN mirror link base (`{base}/{code}/{code}.srs`)
    pub cdn_base: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            raw_base: DEFAULT_RAW_LINK_BASE.to_string(),
            cdn_base: DEFAULT_CDN_LINK_BASE.to_string(),
        }
    }
}

impl LinkConfig {
    pub fn raw_link(&self, code: &str) -> String {
        self.raw_file_link(code, code)
    }

    pub fn cdn_link(&self, code: &str) -> String {
        self.cdn_file_link(code, code)
    }

    /// Raw link of `{dir}/{name}.srs`; backslashes in `dir` become slashes.
    pub fn raw_file_link(&self, dir: &str, name: &str) -> String {
        file_link(&self.raw_base, dir, name)
    }

    pub fn cdn_file_link(&self, dir: &str, name: &str) -> String {
        file_link(&self.cdn_base, dir, name)
    }
}

fn file_link(base: &str, dir: &str, name: &str) -> String {
    format!(
        "{}/{}/{}.srs",
        base.trim_end_matches('/'),
        dir.replace('\\', "/").trim_matches('/'),
        name
    )
}

/// Settings for the merged rule sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSettings {
    /// JSON file listing the merged sets
    pub config_path: PathBuf,
    /// Directory of plain rule sets (`<name>/<name>.json`)
    pub rule_dir: PathBuf,
    /// Root that merged set paths are relative to
    pub root_dir: PathBuf,
    /// Link bases of the repository root, used in merged set READMEs
    pub links: LinkConfig,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_MERGE_CONFIG),
            rule_dir: PathBuf::from(DEFAULT_RULE_DIR),
            root_dir: PathBuf::from("."),
            links: LinkConfig {
                raw_base: DEFAULT_REPO_RAW_BASE.to_string(),
                cdn_base: DEFAULT_REPO_CDN_BASE.to_string(),
            },
        }
    }
}

/// Configuration for one generator run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Upstream repository as `owner/name`
    pub repository: String,
    pub dataset_asset: String,
    pub checksum_asset: String,
    pub output_dir: PathBuf,
    /// GitHub REST API base URL
    pub api_base: String,
    /// Access token for the release lookup (unauthenticated when `None`)
    pub github_token: Option<String>,
    pub links: LinkConfig,
    pub merge: MergeSettings,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            repository: DEFAULT_REPOSITORY.to_string(),
            dataset_asset: DEFAULT_DATASET_ASSET.to_string(),
            checksum_asset: DEFAULT_CHECKSUM_ASSET.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            api_base: DEFAULT_API_BASE.to_string(),
            github_token: None,
            links: LinkConfig::default(),
            merge: MergeSettings::default(),
        }
    }
}

impl GeneratorConfig {
    /// Split the repository into owner and name.
    pub fn repository_parts(&self) -> Result<(&str, &str)> {
        match self.repository.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok((owner, name))
            }
            _ => Err(Error::Config(format!(
                "repository must be owner/name, got {:?}",
                self.repository
            ))),
        }
    }

    /// Set the token, treating an empty string as absent.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.github_token = token.filter(|t| !t.trim().is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.repository, "v2fly/domain-list-community");
        assert_eq!(config.dataset_asset, "dlc.dat");
        assert_eq!(config.checksum_asset, "dlc.dat.sha256sum");
        assert_eq!(config.output_dir, PathBuf::from("sing-geosite"));
        assert!(config.github_token.is_none());
    }

    #[test]
    fn test_repository_parts() {
        let config = GeneratorConfig::default();
        assert_eq!(
            config.repository_parts().unwrap(),
            ("v2fly", "domain-list-community")
        );

        for bad in ["v2fly", "/x", "x/", "a/b/c"] {
            let config = GeneratorConfig {
                repository: bad.to_string(),
                ..Default::default()
            };
            assert!(config.repository_parts().is_err(), "accepted {}", bad);
        }
    }

    #[test]
    fn test_links() {
        let links = LinkConfig::default();
        assert_eq!(
            links.raw_link("google"),
            "https://raw.githubusercontent.com/yzxiu/singbox_ruleset/main/sing-geosite/google/google.srs"
        );
        assert_eq!(
            links.cdn_link("category-games@cn"),
            "https://cdn.jsdelivr.net/gh/yzxiu/singbox_ruleset@main/sing-geosite/category-games@cn/category-games@cn.srs"
        );
    }

    #[test]
    fn test_file_links() {
        let links = MergeSettings::default().links;
        assert_eq!(
            links.raw_file_link("rule\\merged", "Streaming"),
            "https://raw.githubusercontent.com/yzxiu/singbox_ruleset/main/rule/merged/Streaming.srs"
        );
        assert_eq!(
            links.cdn_file_link("rule/merged/", "Streaming"),
            "https://cdn.jsdelivr.net/gh/yzxiu/singbox_ruleset@main/rule/merged/Streaming.srs"
        );

        // Category links are the same file links with the code as directory
        let links = LinkConfig::default();
        assert_eq!(links.raw_file_link("cn", "cn"), links.raw_link("cn"));
    }

    #[test]
    fn test_empty_token_is_absent() {
        let config = GeneratorConfig::default().with_token(Some("  ".to_string()));
        assert!(config.github_token.is_none());

        let config = GeneratorConfig::default().with_token(Some("ghp_x".to_string()));
        assert_eq!(config.github_token.as_deref(), Some("ghp_x"));
    }
}

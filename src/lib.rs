//! sing-geosite - Generate sing-box rule sets from the v2fly geosite dataset.
//!
//! The generator fetches the latest `dlc.dat` release, verifies it against
//! its published SHA-256 checksum, decodes the protobuf category list,
//! normalizes the category tags and writes one rule-set directory per
//! category.
//!
//! # Pipeline
//!
//! 1. **Fetch**: latest release lookup, dataset and checksum download
//! 2. **Decode**: `GeoSiteList` protobuf to a map of category code to items
//! 3. **Filter**: drop self-tags (`foo-bar@bar`), apply negations (`foo-bar@!bar`)
//! 4. **Merge**: fold China-scoped categories into `geolocation-cn` and `cn`
//! 5. **Write**: `<code>/<code>.json`, `<code>/<code>.srs` and `<code>/README.md`
//! 6. **Merge** (optional): union generated sets into the named sets of a
//!    merge config ([`merged`])
//!
//! # Quick Start
//!
//! ```ignore
//! use sing_geosite::{run, GeneratorConfig, ReleaseClient};
//!
//! let config = GeneratorConfig::default();
//! let client = ReleaseClient::from_config(&config)?;
//! let summary = run(&client, &config)?;
//! println!("{} rule sets written", summary.write.written);
//! ```
//!
//! A dataset already on disk goes through [`generate`] directly:
//!
//! ```ignore
//! let data = std::fs::read("dlc.dat")?;
//! sing_geosite::generate(&data, &GeneratorConfig::default())?;
//! ```
//!
//! # Item kinds
//!
//! - **domain**: exact domain match
//! - **domain_suffix**: suffix match (`.example.com` or root `cn`)
//! - **domain_keyword**: substring match
//! - **domain_regex**: regular expression match

mod error;

pub mod category;
pub mod config;
pub mod decoder;
pub mod item;
pub mod merged;
pub mod normalize;
pub mod pipeline;
pub mod proto;
pub mod remote;
pub mod ruleset;
pub mod srs;
pub mod writer;

// Re-export core types
pub use error::{Error, ErrorKind, Result};
pub use item::{DomainItem, ItemKind};
pub use category::CategoryMap;

// Re-export configuration
pub use config::{GeneratorConfig, LinkConfig, MergeSettings};

// Re-export pipeline entry points
pub use pipeline::{generate, run, GenerateSummary};
pub use remote::ReleaseClient;
pub use merged::{run_merge, MergeSummary, MergedRuleSetConfig, RuleSetMerger};

// Re-export rule-set types
pub use ruleset::{compile, DefaultHeadlessRule, HeadlessRule, PlainRuleSet, RuleSetEncoder};
pub use writer::{RuleSetWriter, WriteSummary};

//! Merged rule sets built from already generated rule sets.
//!
//! A merge config lists named sets, each combining several sources:
//!
//! ```json
//! {
//!   "merged_rulesets": [
//!     {
//!       "name": "Streaming",
//!       "path": "rule/merged/Streaming",
//!       "rulesets": ["geosite:netflix", "geosite:hulu", "YouTube"]
//!     }
//!   ]
//! }
//! ```
//!
//! `geosite:<code>` reads `<output>/<code>/<code>.json`; any other name reads
//! `<rule_dir>/<name>/<name>.json`. The buckets of all sources are unioned
//! and written as `<root>/<path>/<name>.{json,srs}` plus a README.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use crate::config::GeneratorConfig;
use crate::item::{union, DomainItem};
use crate::ruleset::{HeadlessRule, PlainRuleSet, RuleSetEncoder};
use crate::srs::SrsWriter;
use crate::writer::RuleSetWriter;
use crate::{Error, Result};

/// Prefix selecting a category generated from the geosite dataset.
pub const GEOSITE_PREFIX: &str = "geosite:";

/// One merged set from the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MergedRuleSetConfig {
    pub name: String,
    /// Output directory, relative to the merge root
    pub path: String,
    /// Source rule sets, in merge order
    pub rulesets: Vec<String>,
}

/// Where a merged set reads one of its sources from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSetSource {
    /// A generated geosite category
    Geosite(String),
    /// A rule set under the rule directory
    Rule(String),
}

impl RuleSetSource {
    pub fn parse(name: &str) -> Self {
        match name.strip_prefix(GEOSITE_PREFIX) {
            Some(code) => RuleSetSource::Geosite(code.to_string()),
            None => RuleSetSource::Rule(name.to_string()),
        }
    }

    /// Path of the source JSON file.
    pub fn json_path(&self, geosite_dir: &Path, rule_dir: &Path) -> PathBuf {
        match self {
            RuleSetSource::Geosite(code) => geosite_dir.join(code).join(format!("{}.json", code)),
            RuleSetSource::Rule(name) => rule_dir.join(name).join(format!("{}.json", name)),
        }
    }
}

impl fmt::Display for RuleSetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSetSource::Geosite(code) => write!(f, "{}{}", GEOSITE_PREFIX, code),
            RuleSetSource::Rule(name) => write!(f, "{}", name),
        }
    }
}

/// Outcome of [`RuleSetMerger::merge_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Merged sets written, in config order
    pub written: Vec<String>,
    /// Merged sets not written (invalid, empty or failing), in config order
    pub skipped: Vec<String>,
}

/// Parse a merge config.
///
/// A missing or malformed `merged_rulesets` list is an error; an entry that
/// lacks a field is logged and dropped.
pub fn parse_merge_config(text: &str) -> Result<Vec<MergedRuleSetConfig>> {
    let config: Value = serde_json::from_str(text)?;
    let entries = match config.get("merged_rulesets") {
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(Error::Config(
                "\"merged_rulesets\" must be a list".to_string(),
            ))
        }
        None => {
            return Err(Error::Config(
                "merge config is missing \"merged_rulesets\"".to_string(),
            ))
        }
    };

    let mut merged = Vec::with_capacity(entries.len());
    for entry in entries {
        match MergedRuleSetConfig::deserialize(entry) {
            Ok(config) => merged.push(config),
            Err(e) => log::error!("invalid merged rule set config: {}", e),
        }
    }
    Ok(merged)
}

/// Load the merge config, or `None` when the file does not exist.
pub fn load_merge_config(path: &Path) -> Result<Option<Vec<MergedRuleSetConfig>>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::warn!("merge config {:?} not found, skipping merge", path);
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    parse_merge_config(&text).map(Some)
}

/// Read the items of a rule-set JSON file, in either listable form.
pub fn read_rule_set_items(path: &Path) -> Result<Vec<DomainItem>> {
    let rule_set: PlainRuleSet = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    let mut items = Vec::new();
    for rule in &rule_set.rules {
        match rule {
            HeadlessRule::Default(rule) => items.extend(rule.items()),
        }
    }
    Ok(items)
}

/// Builds merged rule sets from generated outputs.
pub struct RuleSetMerger<E> {
    geosite_dir: PathBuf,
    rule_dir: PathBuf,
    writer: RuleSetWriter<E>,
}

impl<E: RuleSetEncoder> RuleSetMerger<E> {
    pub fn new(
        geosite_dir: impl Into<PathBuf>,
        rule_dir: impl Into<PathBuf>,
        writer: RuleSetWriter<E>,
    ) -> Self {
        Self {
            geosite_dir: geosite_dir.into(),
            rule_dir: rule_dir.into(),
            writer,
        }
    }

    /// Union the items of every readable source. Missing or unreadable
    /// sources are logged and left out.
    pub fn collect(&self, config: &MergedRuleSetConfig) -> Vec<DomainItem> {
        let mut lists = Vec::with_capacity(config.rulesets.len());
        for name in &config.rulesets {
            let source = RuleSetSource::parse(name);
            let path = source.json_path(&self.geosite_dir, &self.rule_dir);
            if !path.exists() {
                log::warn!("rule set {} not found at {:?}, skipping", source, path);
                continue;
            }
            match read_rule_set_items(&path) {
                Ok(items) => {
                    log::info!("merged {} into {}", source, config.name);
                    lists.push(items);
                }
                Err(e) => log::error!("failed to merge {} into {}: {}", source, config.name, e),
            }
        }
        union(lists.iter().map(Vec::as_slice))
    }

    /// Build and write one merged set. Returns `Ok(false)` when it has no
    /// items and nothing was written.
    pub fn merge_one(&self, config: &MergedRuleSetConfig) -> Result<bool> {
        log::info!("merging rule set {}", config.name);
        let items = self.collect(config);

        let rule = crate::ruleset::compile(&items);
        log::info!(
            "{} - domain: {}, domain_suffix: {}, domain_keyword: {}, domain_regex: {}",
            config.name,
            rule.domain.len(),
            rule.domain_suffix.len(),
            rule.domain_keyword.len(),
            rule.domain_regex.len()
        );

        if items.is_empty() {
            log::warn!("merged rule set {} is empty, not written", config.name);
            return Ok(false);
        }
        self.writer.write_at(&config.path, &config.name, &items)?;
        log::info!("created merged rule set {}", config.name);
        Ok(true)
    }

    /// Build every merged set. A failing set is logged and skipped.
    pub fn merge_all(&self, configs: &[MergedRuleSetConfig]) -> MergeSummary {
        log::info!("found {} merged rule set(s) to process", configs.len());
        let mut summary = MergeSummary::default();

        for config in configs {
            if config.rulesets.is_empty() {
                log::warn!("no rule sets listed for {}, skipping", config.name);
                summary.skipped.push(config.name.clone());
                continue;
            }
            match self.merge_one(config) {
                Ok(true) => summary.written.push(config.name.clone()),
                Ok(false) => summary.skipped.push(config.name.clone()),
                Err(e) => {
                    log::warn!("failed to save merged rule set {}: {}", config.name, e);
                    summary.skipped.push(config.name.clone());
                }
            }
        }
        summary
    }
}

/// Load the configured merge file and build every merged set.
pub fn run_merge(config: &GeneratorConfig) -> Result<MergeSummary> {
    log::info!("loading merge configuration...");
    let Some(configs) = load_merge_config(&config.merge.config_path)? else {
        return Ok(MergeSummary::default());
    };

    let writer = RuleSetWriter::new(
        &config.merge.root_dir,
        config.merge.links.clone(),
        SrsWriter::new(),
    );
    let merger = RuleSetMerger::new(&config.output_dir, &config.merge.rule_dir, writer);
    Ok(merger.merge_all(&configs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinkConfig;

    fn write_json(path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn merger(root: &Path) -> RuleSetMerger<SrsWriter> {
        let writer = RuleSetWriter::new(root, LinkConfig::default(), SrsWriter::new());
        RuleSetMerger::new(root.join("sing-geosite"), root.join("rule"), writer)
    }

    fn merged(name: &str, rulesets: &[&str]) -> MergedRuleSetConfig {
        MergedRuleSetConfig {
            name: name.to_string(),
            path: format!("rule/merged/{}", name),
            rulesets: rulesets.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_parse_merge_config() {
        let text = r#"{
            "merged_rulesets": [
                {"name": "A", "path": "rule/A", "rulesets": ["geosite:google", "YouTube"]},
                {"name": "B", "rulesets": ["x"]},
                {"name": "C", "path": "rule/C", "rulesets": []}
            ]
        }"#;

        let configs = parse_merge_config(text).unwrap();

        // B lacks a path and is dropped
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].name, "A");
        assert_eq!(configs[0].rulesets, vec!["geosite:google", "YouTube"]);
        assert!(configs[1].rulesets.is_empty());
    }

    #[test]
    fn test_parse_merge_config_errors() {
        assert!(matches!(parse_merge_config("{}"), Err(Error::Config(_))));
        assert!(matches!(
            parse_merge_config(r#"{"merged_rulesets": {}}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(parse_merge_config("not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let temp = tempfile::tempdir().unwrap();
        let loaded = load_merge_config(&temp.path().join("merge_config.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_source_paths() {
        let geosite = Path::new("out");
        let rule = Path::new("rule");

        let source = RuleSetSource::parse("geosite:category-games@cn");
        assert_eq!(source, RuleSetSource::Geosite("category-games@cn".to_string()));
        assert_eq!(
            source.json_path(geosite, rule),
            Path::new("out/category-games@cn/category-games@cn.json")
        );
        assert_eq!(source.to_string(), "geosite:category-games@cn");

        let source = RuleSetSource::parse("YouTube");
        assert_eq!(source.json_path(geosite, rule), Path::new("rule/YouTube/YouTube.json"));
    }

    #[test]
    fn test_read_listable_forms() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("a.json");
        write_json(
            &path,
            r#"{"version": 2, "rules": [
                {"domain": "a.com", "domain_suffix": [".a.com", ".b.com"], "ip_cidr": ["1.1.1.1/32"]},
                {"process_name": ["a.exe"]}
            ]}"#,
        );

        let items = read_rule_set_items(&path).unwrap();

        assert_eq!(
            items,
            vec![
                DomainItem::domain("a.com"),
                DomainItem::suffix(".a.com"),
                DomainItem::suffix(".b.com"),
            ]
        );
    }

    #[test]
    fn test_merge_unions_sources() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        write_json(
            &root.join("sing-geosite/netflix/netflix.json"),
            r#"{"rules": [{"domain": ["netflix.com", "fast.com"], "domain_keyword": "nflx"}]}"#,
        );
        write_json(
            &root.join("rule/Hulu/Hulu.json"),
            r#"{"rules": [{"domain": ["hulu.com", "fast.com"], "domain_regex": "^hulu\\d+\\.com$"}]}"#,
        );

        let merger = merger(root);
        let summary = merger.merge_all(&[merged("Streaming", &["geosite:netflix", "Hulu", "missing"])]);

        assert_eq!(summary.written, vec!["Streaming"]);
        let out = root.join("rule/merged/Streaming");
        let json: Value =
            serde_json::from_str(&fs::read_to_string(out.join("Streaming.json")).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "rules": [{
                    "domain": ["netflix.com", "fast.com", "hulu.com"],
                    "domain_keyword": "nflx",
                    "domain_regex": "^hulu\\d+\\.com$"
                }]
            })
        );
        assert!(out.join("Streaming.srs").exists());

        let readme = fs::read_to_string(out.join("README.md")).unwrap();
        assert!(readme.contains("/rule/merged/Streaming/Streaming.srs"));
    }

    #[test]
    fn test_merge_skips_empty_and_invalid() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        write_json(&root.join("rule/Broken/Broken.json"), "{not json");
        write_json(
            &root.join("rule/Ok/Ok.json"),
            r#"{"rules": [{"domain": "ok.com"}]}"#,
        );

        let mut escaping = merged("Escape", &["Ok"]);
        escaping.path = "../outside".to_string();

        let summary = merger(root).merge_all(&[
            merged("Nothing", &["missing", "Broken"]),
            merged("NoSources", &[]),
            escaping,
            merged("Good", &["Broken", "Ok"]),
        ]);

        assert_eq!(summary.written, vec!["Good"]);
        assert_eq!(summary.skipped, vec!["Nothing", "NoSources", "Escape"]);
        assert!(!root.join("rule/merged/Nothing").exists());
        assert!(root.join("rule/merged/Good/Good.json").exists());
    }
}

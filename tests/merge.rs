//! Merged rule sets built on top of a generated output tree.

use prost::Message;
use serde_json::{json, Value};
use sing_geosite::config::MergeSettings;
use sing_geosite::proto::domain::Type;
use sing_geosite::proto::{Domain, GeoSite, GeoSiteList};
use sing_geosite::srs::SrsReader;
use sing_geosite::{generate, run_merge, GeneratorConfig};
use std::fs;
use std::path::Path;

fn config(root: &Path) -> GeneratorConfig {
    GeneratorConfig {
        output_dir: root.join("sing-geosite"),
        merge: MergeSettings {
            config_path: root.join("merge_config.json"),
            rule_dir: root.join("rule"),
            root_dir: root.to_path_buf(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn generate_dataset(config: &GeneratorConfig) {
    let data = GeoSiteList {
        entry: vec![
            GeoSite::new(
                "netflix",
                vec![
                    Domain::new(Type::Full, "netflix.com"),
                    Domain::new(Type::Plain, "nflx"),
                ],
            ),
            GeoSite::new(
                "category-media",
                vec![Domain::new(Type::Full, "youku.com").with_attribute("cn")],
            ),
        ],
    }
    .encode_to_vec();
    generate(&data, config).unwrap();
}

#[test]
fn test_merge_geosite_and_rule_sources() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();
    let config = config(root);
    generate_dataset(&config);

    fs::create_dir_all(root.join("rule/YouTube")).unwrap();
    fs::write(
        root.join("rule/YouTube/YouTube.json"),
        r#"{"version": 1, "rules": [{"domain_suffix": [".youtube.com", "cn"]}]}"#,
    )
    .unwrap();
    fs::write(
        root.join("merge_config.json"),
        r#"{
            "merged_rulesets": [
                {
                    "name": "Streaming",
                    "path": "merged\\Streaming",
                    "rulesets": ["geosite:netflix", "geosite:cn", "YouTube", "geosite:hulu"]
                }
            ]
        }"#,
    )
    .unwrap();

    let summary = run_merge(&config).unwrap();

    assert_eq!(summary.written, vec!["Streaming"]);
    assert!(summary.skipped.is_empty());

    let dir = root.join("merged/Streaming");
    let merged: Value =
        serde_json::from_str(&fs::read_to_string(dir.join("Streaming.json")).unwrap()).unwrap();
    assert_eq!(
        merged,
        json!({
            "rules": [{
                "domain": ["netflix.com", "youku.com"],
                "domain_suffix": ["cn", ".youtube.com"],
                "domain_keyword": "nflx"
            }]
        })
    );

    let compiled = SrsReader::open(&dir.join("Streaming.srs")).unwrap();
    assert!(compiled.matches("www.youtube.com"));
    assert!(compiled.matches("netflix.com"));
    assert!(compiled.matches("example.cn"));

    let readme = fs::read_to_string(dir.join("README.md")).unwrap();
    assert!(readme.contains(
        "https://raw.githubusercontent.com/yzxiu/singbox_ruleset/main/merged/Streaming/Streaming.srs"
    ));
    assert!(readme.contains(
        "https://cdn.jsdelivr.net/gh/yzxiu/singbox_ruleset@main/merged/Streaming/Streaming.srs"
    ));
}

#[test]
fn test_merge_without_config_file() {
    let temp = tempfile::tempdir().unwrap();
    let config = config(temp.path());
    generate_dataset(&config);

    let summary = run_merge(&config).unwrap();

    assert!(summary.written.is_empty());
    assert!(summary.skipped.is_empty());
}

#[test]
fn test_merge_config_without_list_fails() {
    let temp = tempfile::tempdir().unwrap();
    let config = config(temp.path());
    fs::write(temp.path().join("merge_config.json"), r#"{"merged": []}"#).unwrap();

    let err = run_merge(&config).unwrap_err();

    assert!(matches!(err, sing_geosite::Error::Config(_)));
}

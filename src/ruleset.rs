//! Rule-set container written for every category.
//!
//! The JSON form follows the sing-box source rule-set layout:
//!
//! ```json
//! {
//!   "rules": [
//!     {
//!       "domain": ["example.com", "www.example.com"],
//!       "domain_suffix": ".example.com"
//!     }
//!   ]
//! }
//! ```
//!
//! Empty buckets are omitted and a single-value bucket is written as a
//! bare string.

use serde::{Deserialize, Serialize};

use crate::item::{DomainItem, ItemKind};
use crate::Result;

/// A list of rules, the unit written to `<code>.json` and `<code>.srs`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainRuleSet {
    pub rules: Vec<HeadlessRule>,
}

impl PlainRuleSet {
    /// Wrap a single default rule.
    pub fn single(rule: DefaultHeadlessRule) -> Self {
        Self {
            rules: vec![HeadlessRule::Default(rule)],
        }
    }
}

/// A rule without an outbound. Only the default rule type is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeadlessRule {
    Default(DefaultHeadlessRule),
}

/// The four domain buckets of a default rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultHeadlessRule {
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "listable")]
    pub domain: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "listable")]
    pub domain_suffix: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "listable")]
    pub domain_keyword: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "listable")]
    pub domain_regex: Vec<String>,
}

impl DefaultHeadlessRule {
    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
            && self.domain_suffix.is_empty()
            && self.domain_keyword.is_empty()
            && self.domain_regex.is_empty()
    }

    /// Total number of values across all buckets.
    pub fn len(&self) -> usize {
        self.domain.len()
            + self.domain_suffix.len()
            + self.domain_keyword.len()
            + self.domain_regex.len()
    }

    pub fn bucket(&self, kind: ItemKind) -> &[String] {
        match kind {
            ItemKind::Domain => &self.domain,
            ItemKind::DomainSuffix => &self.domain_suffix,
            ItemKind::DomainKeyword => &self.domain_keyword,
            ItemKind::DomainRegex => &self.domain_regex,
        }
    }

    /// Items of every bucket, bucket by bucket.
    pub fn items(&self) -> Vec<DomainItem> {
        ItemKind::ALL
            .iter()
            .flat_map(|&kind| {
                self.bucket(kind)
                    .iter()
                    .map(move |value| DomainItem::new(kind, value.as_str()))
            })
            .collect()
    }

    fn bucket_mut(&mut self, kind: ItemKind) -> &mut Vec<String> {
        match kind {
            ItemKind::Domain => &mut self.domain,
            ItemKind::DomainSuffix => &mut self.domain_suffix,
            ItemKind::DomainKeyword => &mut self.domain_keyword,
            ItemKind::DomainRegex => &mut self.domain_regex,
        }
    }
}

/// Partition items into buckets by kind, keeping their relative order.
pub fn compile(items: &[DomainItem]) -> DefaultHeadlessRule {
    let mut rule = DefaultHeadlessRule::default();
    for item in items {
        rule.bucket_mut(item.kind).push(item.value.clone());
    }
    rule
}

/// Binary encoding of a rule set.
pub trait RuleSetEncoder {
    /// Encode the rule set into its binary form.
    fn encode(&self, rule_set: &PlainRuleSet) -> Result<Vec<u8>>;

    /// File extension of the encoded form, without the dot.
    fn extension(&self) -> &'static str;
}

/// One value serializes as a bare string, anything else as an array.
mod listable {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    pub fn serialize<S>(values: &[String], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match values {
            [single] => single.serialize(serializer),
            _ => values.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_partitions_by_kind() {
        let items = vec![
            DomainItem::suffix(".b.com"),
            DomainItem::domain("a.com"),
            DomainItem::keyword("ads"),
            DomainItem::suffix(".a.com"),
            DomainItem::regex("^x$"),
            DomainItem::domain("b.com"),
        ];

        let rule = compile(&items);

        assert_eq!(rule.domain, vec!["a.com", "b.com"]);
        assert_eq!(rule.domain_suffix, vec![".b.com", ".a.com"]);
        assert_eq!(rule.domain_keyword, vec!["ads"]);
        assert_eq!(rule.domain_regex, vec!["^x$"]);
        assert_eq!(rule.len(), items.len());
    }

    #[test]
    fn test_json_shape() {
        let rule = compile(&[
            DomainItem::domain("a.com"),
            DomainItem::domain("b.com"),
            DomainItem::suffix(".a.com"),
        ]);
        let json = serde_json::to_value(PlainRuleSet::single(rule)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "rules": [
                    {
                        "domain": ["a.com", "b.com"],
                        "domain_suffix": ".a.com"
                    }
                ]
            })
        );
    }

    #[test]
    fn test_json_field_order() {
        let rule = compile(&[
            DomainItem::regex("r"),
            DomainItem::keyword("k"),
            DomainItem::suffix("s"),
            DomainItem::domain("d"),
        ]);
        let json = serde_json::to_string(&PlainRuleSet::single(rule)).unwrap();

        assert_eq!(
            json,
            r#"{"rules":[{"domain":"d","domain_suffix":"s","domain_keyword":"k","domain_regex":"r"}]}"#
        );
    }

    #[test]
    fn test_json_read_back() {
        let text = r#"{"rules":[{"domain":"a.com","domain_keyword":["x","y"]}]}"#;
        let rule_set: PlainRuleSet = serde_json::from_str(text).unwrap();

        let HeadlessRule::Default(rule) = &rule_set.rules[0];
        assert_eq!(rule.domain, vec!["a.com"]);
        assert_eq!(rule.domain_keyword, vec!["x", "y"]);
        assert!(rule.domain_suffix.is_empty());
        assert!(rule.domain_regex.is_empty());
    }

    #[test]
    fn test_items_follow_bucket_order() {
        let rule = compile(&[
            DomainItem::regex("r"),
            DomainItem::keyword("k"),
            DomainItem::suffix(".s"),
            DomainItem::domain("d"),
            DomainItem::domain("e"),
        ]);

        assert_eq!(
            rule.items(),
            vec![
                DomainItem::domain("d"),
                DomainItem::domain("e"),
                DomainItem::suffix(".s"),
                DomainItem::keyword("k"),
                DomainItem::regex("r"),
            ]
        );
        assert_eq!(compile(&rule.items()), rule);
    }

    #[test]
    fn test_bucket_access() {
        let rule = compile(&[DomainItem::keyword("k")]);
        assert_eq!(rule.bucket(ItemKind::DomainKeyword), ["k".to_string()]);
        assert!(rule.bucket(ItemKind::Domain).is_empty());
        assert!(!rule.is_empty());
        assert!(DefaultHeadlessRule::default().is_empty());
    }
}

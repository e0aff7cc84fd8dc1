//! Filter pass: redundant self-tags and negation carve-outs.

use crate::category::{CategoryCode, CategoryMap, NEGATION};
use crate::item::subtract;

/// Codes touched by [`filter_tags`], each list sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    /// Self-tags removed outright (`foo-bar@bar`)
    pub filtered: Vec<String>,
    /// Negation tags subtracted from their base and removed (`foo-bar@!bar`)
    pub merged: Vec<String>,
}

/// What to do with one compound code.
enum Action {
    Drop,
    Subtract { base: String },
}

fn classify(code: &str) -> Option<Action> {
    let parsed = CategoryCode::parse(code);
    let attribute = parsed.attribute?;
    let last = parsed.last_segment();

    if last == attribute {
        return Some(Action::Drop);
    }
    let negated_attribute = attribute.strip_prefix(NEGATION) == Some(last);
    let negated_segment = last.strip_prefix(NEGATION) == Some(attribute);
    if negated_attribute || negated_segment {
        return Some(Action::Subtract {
            base: parsed.base.to_string(),
        });
    }
    None
}

/// Remove self-tags and apply negation tags.
///
/// All codes are classified first; the map is only changed afterwards.
pub fn filter_tags(mut categories: CategoryMap) -> (CategoryMap, FilterReport) {
    let actions: Vec<(String, Action)> = categories
        .keys()
        .filter_map(|code| classify(code).map(|action| (code.clone(), action)))
        .collect();

    let mut report = FilterReport::default();

    for (code, action) in actions {
        match action {
            Action::Drop => {
                categories.remove(&code);
                report.filtered.push(code);
            }
            Action::Subtract { base } => {
                let Some(negated) = categories.remove(&code) else {
                    log::warn!("bad list not found: {}", code);
                    continue;
                };
                match categories.remove(&base) {
                    Some(items) => {
                        categories.insert(base, subtract(items, &negated));
                    }
                    None => log::warn!("base list not found for {}: {}", code, base),
                }
                report.merged.push(code);
            }
        }
    }

    report.filtered.sort();
    report.merged.sort();
    if !report.filtered.is_empty() {
        log::info!("filtered tags: {}", report.filtered.join(", "));
    }
    if !report.merged.is_empty() {
        log::info!("merged tags: {}", report.merged.join(", "));
    }

    (categories, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::DomainItem;

    fn items(values: &[&str]) -> Vec<DomainItem> {
        values.iter().map(|v| DomainItem::domain(*v)).collect()
    }

    #[test]
    fn test_self_tag_removed() {
        let mut map = CategoryMap::new();
        map.insert("foo-bar".to_string(), items(&["a"]));
        map.insert("foo-bar@bar".to_string(), items(&["a"]));

        let (map, report) = filter_tags(map);

        assert!(!map.contains_key("foo-bar@bar"));
        assert_eq!(map["foo-bar"], items(&["a"]));
        assert_eq!(report.filtered, vec!["foo-bar@bar".to_string()]);
        assert!(report.merged.is_empty());
    }

    #[test]
    fn test_self_tag_without_hyphen() {
        let mut map = CategoryMap::new();
        map.insert("cn@cn".to_string(), items(&["a"]));

        let (map, report) = filter_tags(map);

        assert!(map.is_empty());
        assert_eq!(report.filtered, vec!["cn@cn".to_string()]);
    }

    #[test]
    fn test_negated_attribute_subtracted() {
        let mut map = CategoryMap::new();
        map.insert("foo-bar".to_string(), items(&["a", "b", "c"]));
        map.insert("foo-bar@!bar".to_string(), items(&["b"]));

        let (map, report) = filter_tags(map);

        assert_eq!(map["foo-bar"], items(&["a", "c"]));
        assert!(!map.contains_key("foo-bar@!bar"));
        assert_eq!(report.merged, vec!["foo-bar@!bar".to_string()]);
        assert!(report.filtered.is_empty());
    }

    #[test]
    fn test_negated_segment_subtracted() {
        let mut map = CategoryMap::new();
        map.insert(
            "category-games-!cn".to_string(),
            items(&["steam.com", "qq.com"]),
        );
        map.insert("category-games-!cn@cn".to_string(), items(&["qq.com"]));

        let (map, report) = filter_tags(map);

        assert_eq!(map["category-games-!cn"], items(&["steam.com"]));
        assert!(!map.contains_key("category-games-!cn@cn"));
        assert_eq!(report.merged, vec!["category-games-!cn@cn".to_string()]);
    }

    #[test]
    fn test_missing_base_tolerated() {
        let mut map = CategoryMap::new();
        map.insert("foo-bar@!bar".to_string(), items(&["b"]));

        let (map, report) = filter_tags(map);

        assert!(map.is_empty());
        assert_eq!(report.merged, vec!["foo-bar@!bar".to_string()]);
    }

    #[test]
    fn test_unrelated_tags_untouched() {
        let mut map = CategoryMap::new();
        map.insert("google".to_string(), items(&["google.com"]));
        map.insert("google@ads".to_string(), items(&["ads.google.com"]));
        map.insert("category-games@cn".to_string(), items(&["qq.com"]));

        let (filtered, report) = filter_tags(map.clone());

        assert_eq!(filtered, map);
        assert_eq!(report, FilterReport::default());
    }

    #[test]
    fn test_report_sorted() {
        let mut map = CategoryMap::new();
        map.insert("z-x@x".to_string(), items(&["a"]));
        map.insert("a-y@y".to_string(), items(&["a"]));
        map.insert("m-q@q".to_string(), items(&["a"]));

        let (_, report) = filter_tags(map);

        assert_eq!(report.filtered, vec!["a-y@y", "m-q@q", "z-x@x"]);
    }
}

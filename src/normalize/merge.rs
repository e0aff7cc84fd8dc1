//! Merge pass: aggregate China-scoped categories.

use crate::category::{CategoryCode, CategoryMap};
use crate::item::{union, DomainItem};

/// Aggregated China category.
pub const GEOLOCATION_CN: &str = "geolocation-cn";

/// `geolocation-cn` plus the `cn` top-level suffix.
pub const CN: &str = "cn";

const CATEGORY_PREFIX: &str = "category-";

/// Codes folded into `geolocation-cn` by [`merge_tags`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub sources: Vec<String>,
}

/// `category-X@cn`, unless X is already China-specific.
fn is_attributed_cn(code: &str) -> bool {
    let parsed = CategoryCode::parse(code);
    parsed.attribute == Some("cn")
        && parsed.base.starts_with(CATEGORY_PREFIX)
        && !parsed.base.ends_with("-cn")
        && !parsed.base.ends_with("-!cn")
}

/// `category-X-cn` without an attribute.
fn is_bare_cn(code: &str) -> bool {
    code.starts_with(CATEGORY_PREFIX) && code.ends_with("-cn") && !code.contains('@')
}

/// Fold every China-scoped category into `geolocation-cn` and rebuild `cn`.
///
/// `cn` gets a trailing `DomainSuffix("cn")` appended without checking
/// whether the union already holds it.
pub fn merge_tags(mut categories: CategoryMap) -> (CategoryMap, MergeReport) {
    let mut sources: Vec<String> = categories
        .keys()
        .filter(|code| is_attributed_cn(code))
        .cloned()
        .collect();
    sources.extend(categories.keys().filter(|code| is_bare_cn(code)).cloned());

    let merged = {
        let base = categories.get(GEOLOCATION_CN).map(Vec::as_slice);
        let lists = base.into_iter().chain(
            sources
                .iter()
                .filter_map(|code| categories.get(code).map(Vec::as_slice)),
        );
        union(lists)
    };

    let mut cn = merged.clone();
    cn.push(DomainItem::suffix(CN));
    categories.insert(GEOLOCATION_CN.to_string(), merged);
    categories.insert(CN.to_string(), cn);

    if !sources.is_empty() {
        log::info!("merged cn categories: {}", sources.join(", "));
    }

    (categories, MergeReport { sources })
}

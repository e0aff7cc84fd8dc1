//! Tag normalization passes over a decoded category map.
//!
//! Both passes take the map by value and hand back the transformed map
//! together with a report of what changed:
//!
//! 1. [`filter_tags`] drops redundant self-tags (`foo-bar@bar`) and applies
//!    negation carve-outs (`foo-bar@!bar`) to their base category.
//! 2. [`merge_tags`] folds every China-scoped category into
//!    `geolocation-cn` and derives `cn` from it.

mod filter;
mod merge;

pub use filter::{filter_tags, FilterReport};
pub use merge::{merge_tags, MergeReport, CN, GEOLOCATION_CN};

use crate::category::CategoryMap;

/// Combined report of both passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub filter: FilterReport,
    pub merge: MergeReport,
}

/// Run the filter pass followed by the merge pass.
pub fn normalize(categories: CategoryMap) -> (CategoryMap, NormalizeReport) {
    log::info!("filtering tags...");
    let (categories, filter) = filter_tags(categories);
    log::info!("merging cn tags...");
    let (categories, merge) = merge_tags(categories);
    (categories, NormalizeReport { filter, merge })
}

//! Typed domain items and item-list helpers.

use ahash::AHashSet;
use std::fmt;

/// ItemKind selects how a domain item is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKind {
    /// Exact domain match
    Domain,
    /// Suffix match (`.example.com` or bare `cn`)
    DomainSuffix,
    /// Substring match
    DomainKeyword,
    /// Regular expression match
    DomainRegex,
}

impl ItemKind {
    /// Every kind, in JSON bucket order.
    pub const ALL: [ItemKind; 4] = [
        ItemKind::Domain,
        ItemKind::DomainSuffix,
        ItemKind::DomainKeyword,
        ItemKind::DomainRegex,
    ];

    /// Get the canonical string representation (the JSON bucket name).
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Domain => "domain",
            ItemKind::DomainSuffix => "domain_suffix",
            ItemKind::DomainKeyword => "domain_keyword",
            ItemKind::DomainRegex => "domain_regex",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single typed classification unit. Identity is the `(kind, value)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainItem {
    pub kind: ItemKind,
    pub value: String,
}

impl DomainItem {
    pub fn new(kind: ItemKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn domain(value: impl Into<String>) -> Self {
        Self::new(ItemKind::Domain, value)
    }

    pub fn suffix(value: impl Into<String>) -> Self {
        Self::new(ItemKind::DomainSuffix, value)
    }

    pub fn keyword(value: impl Into<String>) -> Self {
        Self::new(ItemKind::DomainKeyword, value)
    }

    pub fn regex(value: impl Into<String>) -> Self {
        Self::new(ItemKind::DomainRegex, value)
    }
}

impl fmt::Display for DomainItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

/// Remove duplicate items, keeping the first occurrence of each.
pub fn uniq(items: Vec<DomainItem>) -> Vec<DomainItem> {
    let mut seen = AHashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Items of `base` that do not appear in `remove`, in `base` order.
pub fn subtract(base: Vec<DomainItem>, remove: &[DomainItem]) -> Vec<DomainItem> {
    let remove: AHashSet<&DomainItem> = remove.iter().collect();
    let mut seen = AHashSet::with_capacity(base.len());
    base.into_iter()
        .filter(|item| !remove.contains(item) && seen.insert(item.clone()))
        .collect()
}

/// Set union of several item lists in first-seen order.
pub fn union<'a, I>(lists: I) -> Vec<DomainItem>
where
    I: IntoIterator<Item = &'a [DomainItem]>,
{
    let mut seen = AHashSet::new();
    let mut out = Vec::new();
    for list in lists {
        for item in list {
            if seen.insert(item) {
                out.push(item.clone());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;


    #[test]
    fn test_item_identity_is_kind_and_value() {
        assert_eq!(DomainItem::domain("a.com"), DomainItem::domain("a.com"));
        assert_ne!(DomainItem::domain("a.com"), DomainItem::suffix("a.com"));
    }

    #[test]
    fn test_uniq_keeps_first_occurrence() {
        let items = vec![
            DomainItem::domain("a.com"),
            DomainItem::suffix(".a.com"),
            DomainItem::domain("a.com"),
            DomainItem::keyword("a"),
        ];
        assert_eq!(
            uniq(items),
            vec![
                DomainItem::domain("a.com"),
                DomainItem::suffix(".a.com"),
                DomainItem::keyword("a"),
            ]
        );
    }

    #[test]
    fn test_subtract() {
        let base = vec![
            DomainItem::domain("a"),
            DomainItem::domain("b"),
            DomainItem::domain("c"),
        ];
        let result = subtract(base, &[DomainItem::domain("b"), DomainItem::domain("z")]);
        assert_eq!(result, vec![DomainItem::domain("a"), DomainItem::domain("c")]);
    }

    #[test]
    fn test_union() {
        let x = vec![DomainItem::domain("x"), DomainItem::domain("y")];
        let y = vec![DomainItem::domain("y"), DomainItem::regex("^z$")];
        let result = union([x.as_slice(), y.as_slice()]);
        assert_eq!(
            result,
            vec![
                DomainItem::domain("x"),
                DomainItem::domain("y"),
                DomainItem::regex("^z$"),
            ]
        );
    }
}

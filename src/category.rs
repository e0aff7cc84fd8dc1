//! Category codes and the category map.

use std::collections::BTreeMap;

use crate::item::DomainItem;

/// Category code to its item list. Sorted by code so every pass and the
/// writer walk categories in a stable order.
pub type CategoryMap = BTreeMap<String, Vec<DomainItem>>;

/// Separator between a base code and an attribute.
pub const ATTRIBUTE_SEPARATOR: char = '@';

/// Negation marker on an attribute or trailing code segment.
pub const NEGATION: char = '!';

/// A borrowed view of a category code, split into base and attribute.
///
/// Codes with more than one `@` are treated as bare codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCode<'a> {
    pub base: &'a str,
    pub attribute: Option<&'a str>,
}

impl<'a> CategoryCode<'a> {
    pub fn parse(code: &'a str) -> Self {
        let mut parts = code.split(ATTRIBUTE_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(base), Some(attribute), None) => Self {
                base,
                attribute: Some(attribute),
            },
            _ => Self {
                base: code,
                attribute: None,
            },
        }
    }

    pub fn is_compound(&self) -> bool {
        self.attribute.is_some()
    }

    /// The trailing hyphen segment of the base, or the whole base when it has
    /// no hyphen or ends with one.
    pub fn last_segment(&self) -> &'a str {
        match self.base.rsplit_once('-') {
            Some((_, last)) if !last.is_empty() => last,
            _ => self.base,
        }
    }
}

/// Build a compound code `base@attribute`.
pub fn compound_code(base: &str, attribute: &str) -> String {
    format!("{}{}{}", base, ATTRIBUTE_SEPARATOR, attribute)
}

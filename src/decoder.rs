//! Decoder for the binary geosite dataset.

use ahash::AHashMap;
use prost::Message;

use crate::category::{compound_code, CategoryMap};
use crate::item::{uniq, DomainItem};
use crate::proto::{domain, Domain, GeoSiteList};
use crate::Result;

/// Decode a `GeoSiteList` blob into a category map.
///
/// Every entry yields its lower-cased code, and every attribute key seen on
/// one of its domains yields an extra `code@key` category holding only the
/// domains carrying that key.
pub fn decode(data: &[u8]) -> Result<CategoryMap> {
    let list = GeoSiteList::decode(data)?;
    let mut categories = CategoryMap::new();

    for entry in &list.entry {
        let code = entry.country_code.to_lowercase();
        let mut items = Vec::with_capacity(entry.domain.len() * 2);
        // Attribute keys in first-seen order, each with its domains.
        let mut attribute_keys: Vec<&str> = Vec::new();
        let mut attributes: AHashMap<&str, Vec<&Domain>> = AHashMap::new();

        for record in &entry.domain {
            for attribute in &record.attribute {
                let key = attribute.key.as_str();
                attributes
                    .entry(key)
                    .or_insert_with(|| {
                        attribute_keys.push(key);
                        Vec::new()
                    })
                    .push(record);
            }
            push_items(&mut items, record);
        }

        categories.insert(code.clone(), uniq(items));

        for key in attribute_keys {
            let Some(records) = attributes.get(key) else {
                continue;
            };
            let mut attribute_items = Vec::with_capacity(records.len() * 2);
            for record in records {
                push_items(&mut attribute_items, record);
            }
            categories.insert(compound_code(&code, key), uniq(attribute_items));
        }
    }

    Ok(categories)
}

/// Map one domain record onto its typed items.
///
/// A root domain becomes an exact match (only when it contains a dot) plus
/// a dotted suffix. Unknown record types are skipped.
pub fn push_items(items: &mut Vec<DomainItem>, record: &Domain) {
    let Ok(kind) = domain::Type::try_from(record.r#type) else {
        log::debug!("skipping domain {:?} with unknown type {}", record.value, record.r#type);
        return;
    };
    match kind {
        domain::Type::Plain => items.push(DomainItem::keyword(record.value.as_str())),
        domain::Type::Regex => items.push(DomainItem::regex(record.value.as_str())),
        domain::Type::RootDomain => {
            if record.value.contains('.') {
                items.push(DomainItem::domain(record.value.as_str()));
            }
            items.push(DomainItem::suffix(format!(".{}", record.value)));
        }
        domain::Type::Full => items.push(DomainItem::domain(record.value.as_str())),
    }
}

//! Domain matcher stored in the domain rule item.

use ahash::AHashSet;
use std::io::Write;

use super::succinct::SuccinctSet;
use crate::Result;

/// Edge label meaning "any further labels match".
pub const PREFIX_LABEL: u8 = b'\r';

/// Edge label meaning "matches at a label boundary".
pub const ROOT_LABEL: u8 = b'\n';

/// Exact and suffix domain matcher backed by a [`SuccinctSet`] of
/// reversed domains.
///
/// - `example.com` in `domains`: matches only `example.com`
/// - `.example.com` in `suffixes`: matches `www.example.com`, not `example.com`
/// - `example.com` in `suffixes`: matches `example.com` and its subdomains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainMatcher {
    set: SuccinctSet,
}

impl DomainMatcher {
    pub fn new(domains: &[String], suffixes: &[String]) -> Self {
        let mut keys: Vec<String> = Vec::with_capacity(domains.len() + 2 * suffixes.len());
        let mut seen: AHashSet<&str> = AHashSet::with_capacity(keys.capacity());

        for suffix in suffixes {
            if !seen.insert(suffix.as_str()) {
                continue;
            }
            if suffix.starts_with('.') {
                keys.push(reverse_domain_suffix(suffix));
            } else {
                keys.push(reverse_domain(suffix));
                keys.push(reverse_root_domain_suffix(suffix));
            }
        }
        for domain in domains {
            if !seen.insert(domain.as_str()) {
                continue;
            }
            keys.push(reverse_domain(domain));
        }

        keys.sort();
        keys.dedup();
        Self {
            set: SuccinctSet::new(&keys),
        }
    }

    pub fn matches(&self, domain: &str) -> bool {
        self.set.has(reverse_domain(domain).as_bytes())
    }

    pub fn write<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        self.set.write(writer)
    }

    pub fn read(reader: &mut &[u8]) -> Result<Self> {
        Ok(Self {
            set: SuccinctSet::read(reader)?,
        })
    }
}

/// Reverse a domain character-wise (`www.google.com` -> `moc.elgoog.www`).
pub fn reverse_domain(domain: &str) -> String {
    domain.chars().rev().collect()
}

fn reverse_domain_suffix(suffix: &str) -> String {
    let mut key = reverse_domain(suffix);
    key.push(PREFIX_LABEL as char);
    key
}

fn reverse_root_domain_suffix(domain: &str) -> String {
    let mut key = reverse_domain(domain);
    key.push('.');
    key.push(PREFIX_LABEL as char);
    key
}

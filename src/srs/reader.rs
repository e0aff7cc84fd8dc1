//! `.srs` rule-set reader.

use flate2::read::ZlibDecoder;
use regex::Regex;
use std::fs;
use std::io::Read;
use std::path::Path;

use super::format::*;
use super::matcher::DomainMatcher;
use crate::{Error, Result};

/// A decoded default rule, ready for matching.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub domain: Option<DomainMatcher>,
    pub domain_keyword: Vec<String>,
    pub domain_regex: Vec<Regex>,
    pub invert: bool,
}

impl CompiledRule {
    /// A domain matches when any domain item matches (then `invert` applies).
    pub fn matches(&self, domain: &str) -> bool {
        let matched = self.domain.as_ref().is_some_and(|m| m.matches(domain))
            || self.domain_keyword.iter().any(|k| domain.contains(k.as_str()))
            || self.domain_regex.iter().any(|r| r.is_match(domain));
        matched != self.invert
    }
}

/// A decoded `.srs` file.
#[derive(Debug, Clone)]
pub struct CompiledRuleSet {
    pub version: u8,
    pub rules: Vec<CompiledRule>,
}

impl CompiledRuleSet {
    pub fn matches(&self, domain: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(domain))
    }
}

/// Reads version 1 `.srs` files.
pub struct SrsReader;

impl SrsReader {
    /// Read a rule-set file.
    pub fn open(path: &Path) -> Result<CompiledRuleSet> {
        let data = fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Decode rule-set bytes.
    pub fn from_bytes(data: &[u8]) -> Result<CompiledRuleSet> {
        if data.len() < MAGIC.len() + 1 {
            return Err(Error::InvalidRuleSet("file too small".to_string()));
        }
        if data[..MAGIC.len()] != MAGIC {
            return Err(Error::InvalidMagic);
        }
        let version = data[MAGIC.len()];
        if version != RULE_SET_VERSION_1 {
            return Err(Error::UnsupportedVersion(version));
        }

        let mut payload = Vec::new();
        ZlibDecoder::new(&data[MAGIC.len() + 1..])
            .read_to_end(&mut payload)
            .map_err(|e| Error::InvalidRuleSet(format!("zlib decompression failed: {}", e)))?;

        let mut reader = payload.as_slice();
        let count = read_len(&mut reader)?;
        let mut rules = Vec::with_capacity(count.min(MAX_PREALLOC));
        for _ in 0..count {
            rules.push(read_rule(&mut reader)?);
        }
        if !reader.is_empty() {
            return Err(Error::InvalidRuleSet(format!(
                "{} trailing bytes after rules",
                reader.len()
            )));
        }

        Ok(CompiledRuleSet { version, rules })
    }
}

fn read_rule(reader: &mut &[u8]) -> Result<CompiledRule> {
    match read_u8(reader)? {
        RULE_TYPE_DEFAULT => read_default_rule(reader),
        RULE_TYPE_LOGICAL => Err(Error::InvalidRuleSet(
            "logical rules are not supported".to_string(),
        )),
        other => Err(Error::InvalidRuleSet(format!("unknown rule type: {}", other))),
    }
}

fn read_default_rule(reader: &mut &[u8]) -> Result<CompiledRule> {
    let mut rule = CompiledRule {
        domain: None,
        domain_keyword: Vec::new(),
        domain_regex: Vec::new(),
        invert: false,
    };

    loop {
        match read_u8(reader)? {
            ITEM_DOMAIN => rule.domain = Some(DomainMatcher::read(reader)?),
            ITEM_DOMAIN_KEYWORD => rule.domain_keyword = read_strings(reader)?,
            ITEM_DOMAIN_REGEX => {
                rule.domain_regex = read_strings(reader)?
                    .iter()
                    .map(|pattern| {
                        Regex::new(pattern).map_err(|e| {
                            Error::InvalidRuleSet(format!("invalid regex {:?}: {}", pattern, e))
                        })
                    })
                    .collect::<Result<_>>()?;
            }
            ITEM_FINAL => break,
            other => {
                return Err(Error::InvalidRuleSet(format!(
                    "unsupported rule item: {}",
                    other
                )))
            }
        }
    }

    rule.invert = read_u8(reader)? != 0;
    Ok(rule)
}

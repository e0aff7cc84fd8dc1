//! `.srs` rule-set writer.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{BufWriter, Write};

use super::format::*;
use super::matcher::DomainMatcher;
use crate::ruleset::{DefaultHeadlessRule, HeadlessRule, PlainRuleSet, RuleSetEncoder};
use crate::Result;

/// Writes rule sets in the version 1 `.srs` format.
#[derive(Debug, Clone, Copy, Default)]
pub struct SrsWriter;

impl SrsWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write a rule set to `writer`.
    pub fn write<W: Write>(&self, mut writer: W, rule_set: &PlainRuleSet) -> Result<()> {
        writer.write_all(&MAGIC)?;
        writer.write_all(&[RULE_SET_VERSION_1])?;

        let mut encoder = ZlibEncoder::new(writer, Compression::best());
        {
            let mut buffered = BufWriter::new(&mut encoder);
            write_uvarint(&mut buffered, rule_set.rules.len() as u64)?;
            for rule in &rule_set.rules {
                match rule {
                    HeadlessRule::Default(rule) => write_default_rule(&mut buffered, rule)?,
                }
            }
            buffered.flush()?;
        }
        encoder.finish()?;
        Ok(())
    }
}

impl RuleSetEncoder for SrsWriter {
    fn encode(&self, rule_set: &PlainRuleSet) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.write(&mut data, rule_set)?;
        Ok(data)
    }

    fn extension(&self) -> &'static str {
        "srs"
    }
}

fn write_default_rule<W: Write>(writer: &mut W, rule: &DefaultHeadlessRule) -> Result<()> {
    writer.write_all(&[RULE_TYPE_DEFAULT])?;

    if !rule.domain.is_empty() || !rule.domain_suffix.is_empty() {
        writer.write_all(&[ITEM_DOMAIN])?;
        DomainMatcher::new(&rule.domain, &rule.domain_suffix).write(writer)?;
    }
    if !rule.domain_keyword.is_empty() {
        writer.write_all(&[ITEM_DOMAIN_KEYWORD])?;
        write_strings(writer, &rule.domain_keyword)?;
    }
    if !rule.domain_regex.is_empty() {
        writer.write_all(&[ITEM_DOMAIN_REGEX])?;
        write_strings(writer, &rule.domain_regex)?;
    }

    writer.write_all(&[ITEM_FINAL])?;
    // invert
    writer.write_all(&[0])?;
    Ok(())
}

//! Rule-set writer: one directory per category.
//!
//! ```text
//! <output>/<code>/<code>.json   pretty-printed rule set
//! <output>/<code>/<code>.srs    binary rule set
//! <output>/<code>/README.md     download links
//! ```
//!
//! Merged rule sets use the same three files under a nested relative
//! directory ([`RuleSetWriter::write_at`]).

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::category::CategoryMap;
use crate::config::LinkConfig;
use crate::item::DomainItem;
use crate::ruleset::{compile, PlainRuleSet, RuleSetEncoder};
use crate::{Error, Result};

/// Outcome of [`RuleSetWriter::write_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Categories written successfully
    pub written: usize,
    /// Categories with no items, never written
    pub empty: usize,
    /// Categories whose output failed, in write order
    pub skipped: Vec<String>,
}

/// Writes categories as rule-set directories under an output root.
pub struct RuleSetWriter<E> {
    output_dir: PathBuf,
    links: LinkConfig,
    encoder: E,
}

impl<E: RuleSetEncoder> RuleSetWriter<E> {
    pub fn new(output_dir: impl Into<PathBuf>, links: LinkConfig, encoder: E) -> Self {
        Self {
            output_dir: output_dir.into(),
            links,
            encoder,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Remove any previous output and create an empty output root.
    pub fn prepare(&self) -> Result<()> {
        match fs::remove_dir_all(&self.output_dir) {
            Ok(()) => log::debug!("removed previous output {:?}", self.output_dir),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Recreate the output root and write every non-empty category.
    ///
    /// Only a failure to prepare the root is returned; a failing category
    /// is logged and skipped.
    pub fn write_all(&self, categories: &CategoryMap) -> Result<WriteSummary> {
        self.prepare()?;

        log::info!("generating rule sets...");
        let mut summary = WriteSummary::default();
        for (code, items) in categories {
            if items.is_empty() {
                summary.empty += 1;
                continue;
            }

            if let Err(e) = self.write_category(code, items) {
                log::warn!("failed to save rule set {}: {}", code, e);
                summary.skipped.push(code.clone());
                continue;
            }
            summary.written += 1;

            if summary.written % 100 == 0 {
                log::info!("generated {} rule sets...", summary.written);
            }
        }

        log::info!(
            "successfully generated {} rule sets in {:?}",
            summary.written,
            self.output_dir
        );
        Ok(summary)
    }

    /// Write the JSON, binary and README files of one category.
    pub fn write_category(&self, code: &str, items: &[DomainItem]) -> Result<()> {
        validate_code(code)?;
        self.write_at(code, code, items)
    }

    /// Write `<dir>/<name>.json`, `<dir>/<name>.srs` and `<dir>/README.md`
    /// under the output root. `dir` is a relative path and may be nested.
    pub fn write_at(&self, dir: &str, name: &str, items: &[DomainItem]) -> Result<()> {
        validate_code(name)?;
        let target = self.output_dir.join(relative_dir(dir)?);
        fs::create_dir_all(&target)?;

        let rule_set = PlainRuleSet::single(compile(items));

        let json_file = File::create(target.join(format!("{}.json", name)))?;
        let mut json = BufWriter::new(json_file);
        serde_json::to_writer_pretty(&mut json, &rule_set)?;
        json.write_all(b"\n")?;
        json.flush()?;

        let data = self.encoder.encode(&rule_set)?;
        let binary_path = target.join(format!("{}.{}", name, self.encoder.extension()));
        let mut binary = File::create(binary_path)?;
        binary.write_all(&data)?;

        let mut readme = BufWriter::new(File::create(target.join("README.md"))?);
        readme.write_all(render_readme(name, dir, &self.links).as_bytes())?;
        readme.flush()?;

        Ok(())
    }
}

/// Reject codes that would not land in their own directory under the root.
pub fn validate_code(code: &str) -> Result<()> {
    let invalid = code.is_empty()
        || code == "."
        || code == ".."
        || code.contains('/')
        || code.contains('\\')
        || code.contains('\0');
    if invalid {
        return Err(Error::InvalidCode(code.to_string()));
    }
    Ok(())
}

/// Turn a slash or backslash separated relative directory into a path,
/// rejecting absolute paths and parent components.
fn relative_dir(dir: &str) -> Result<PathBuf> {
    let mut path = PathBuf::new();
    for part in dir.split(['/', '\\']).filter(|part| !part.is_empty() && *part != ".") {
        if part == ".." || part.contains('\0') || part.contains(':') {
            return Err(Error::InvalidCode(dir.to_string()));
        }
        path.push(part);
    }
    if path.as_os_str().is_empty() || dir.starts_with(['/', '\\']) {
        return Err(Error::InvalidCode(dir.to_string()));
    }
    Ok(path)
}

/// README for the rule set `<dir>/<name>.srs`.
pub fn render_readme(name: &str, dir: &str, links: &LinkConfig) -> String {
    format!(
        "# {name}\n\n#### 规则链接\n\n**Github**\n{raw}\n\n**CDN**\n{cdn}\n",
        name = name,
        raw = links.raw_file_link(dir, name),
        cdn = links.cdn_file_link(dir, name),
    )
}

//! End-to-end generation: fetch, decode, normalize, write.

use crate::config::GeneratorConfig;
use crate::decoder::decode;
use crate::normalize::{normalize, NormalizeReport};
use crate::remote::ReleaseClient;
use crate::srs::SrsWriter;
use crate::writer::{RuleSetWriter, WriteSummary};
use crate::Result;

/// Outcome of one generator run.
#[derive(Debug, Clone, Default)]
pub struct GenerateSummary {
    /// Categories decoded from the dataset
    pub decoded: usize,
    /// Categories left after normalization
    pub normalized: usize,
    pub report: NormalizeReport,
    pub write: WriteSummary,
}

/// Generate every rule set from raw dataset bytes.
///
/// The output directory is removed and recreated before writing.
pub fn generate(dataset: &[u8], config: &GeneratorConfig) -> Result<GenerateSummary> {
    log::info!("decoding {} bytes of geosite data", dataset.len());
    let categories = decode(dataset)?;
    let decoded = categories.len();
    log::info!("parsed {} categories", decoded);

    let (categories, report) = normalize(categories);
    let normalized = categories.len();

    let writer = RuleSetWriter::new(&config.output_dir, config.links.clone(), SrsWriter::new());
    let write = writer.write_all(&categories)?;
    if !write.skipped.is_empty() {
        log::warn!(
            "skipped {} rule sets: {}",
            write.skipped.len(),
            write.skipped.join(", ")
        );
    }

    Ok(GenerateSummary {
        decoded,
        normalized,
        report,
        write,
    })
}

/// Fetch the latest verified dataset and generate from it.
pub fn run(client: &ReleaseClient, config: &GeneratorConfig) -> Result<GenerateSummary> {
    let dataset = client.fetch_dataset(config)?;
    generate(&dataset, config)
}

//! geosite-gen: CLI tool for generating sing-box rule sets from the v2fly geosite dataset.

use clap::{Args, Parser, Subcommand};
use sing_geosite::config::MergeSettings;
use sing_geosite::remote::verify_checksum;
use sing_geosite::{
    generate, run, run_merge, GenerateSummary, GeneratorConfig, LinkConfig, MergeSummary,
    ReleaseClient,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "geosite-gen")]
#[command(author = "Kaitu.io")]
#[command(version = "0.1.0")]
#[command(about = "Generate sing-box rule sets from the v2fly geosite dataset", long_about = None)]
struct Cli {
    #[command(flatten)]
    options: Options,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Options {
    /// Output directory (removed and recreated on every run)
    #[arg(short, long, global = true, default_value = sing_geosite::config::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Upstream repository as owner/name
    #[arg(long, global = true, default_value = sing_geosite::config::DEFAULT_REPOSITORY)]
    repository: String,

    /// GitHub REST API base URL
    #[arg(long, global = true, default_value = sing_geosite::config::DEFAULT_API_BASE)]
    api_base: String,

    /// Raw download link base written into each README
    #[arg(long, global = true, default_value = sing_geosite::config::DEFAULT_RAW_LINK_BASE)]
    raw_link_base: String,

    /// CDN download link base written into each README
    #[arg(long, global = true, default_value = sing_geosite::config::DEFAULT_CDN_LINK_BASE)]
    cdn_link_base: String,

    /// GitHub access token for the release lookup
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Merge config listing the merged rule sets
    #[arg(long, global = true, default_value = sing_geosite::config::DEFAULT_MERGE_CONFIG)]
    merge_config: PathBuf,

    /// Directory of plain rule sets referenced by name in the merge config
    #[arg(long, global = true, default_value = sing_geosite::config::DEFAULT_RULE_DIR)]
    rule_dir: PathBuf,

    /// Root directory that merged rule set paths are relative to
    #[arg(long, global = true, default_value = ".")]
    merge_root: PathBuf,

    /// Raw download link base of the merge root
    #[arg(long, global = true, default_value = sing_geosite::config::DEFAULT_REPO_RAW_BASE)]
    merge_raw_link_base: String,

    /// CDN download link base of the merge root
    #[arg(long, global = true, default_value = sing_geosite::config::DEFAULT_REPO_CDN_BASE)]
    merge_cdn_link_base: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the latest release, verify it and generate all rule sets
    Build {
        /// Do not build merged rule sets afterwards
        #[arg(long)]
        skip_merge: bool,
    },

    /// Generate all rule sets from a local dlc.dat
    Convert {
        /// Input dataset file
        #[arg(short, long)]
        input: PathBuf,

        /// Checksum file to verify the input against
        #[arg(short, long)]
        checksum: Option<PathBuf>,

        /// Do not build merged rule sets afterwards
        #[arg(long)]
        skip_merge: bool,
    },

    /// Build merged rule sets from already generated output only
    Merge,
}

impl Options {
    fn into_config(self) -> GeneratorConfig {
        GeneratorConfig {
            repository: self.repository,
            output_dir: self.output_dir,
            api_base: self.api_base,
            links: LinkConfig {
                raw_base: self.raw_link_base,
                cdn_base: self.cdn_link_base,
            },
            merge: MergeSettings {
                config_path: self.merge_config,
                rule_dir: self.rule_dir,
                root_dir: self.merge_root,
                links: LinkConfig {
                    raw_base: self.merge_raw_link_base,
                    cdn_base: self.merge_cdn_link_base,
                },
            },
            ..Default::default()
        }
        .with_token(self.github_token)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.options.into_config();

    let result = match cli.command {
        Commands::Build { skip_merge } => build(&config).and_then(|summary| {
            report_generate(&summary, &config);
            merge_unless(skip_merge, &config)
        }),
        Commands::Convert {
            input,
            checksum,
            skip_merge,
        } => convert(&input, checksum.as_ref(), &config).and_then(|summary| {
            report_generate(&summary, &config);
            merge_unless(skip_merge, &config)
        }),
        Commands::Merge => merge(&config),
    };

    match result {
        Ok(()) => log::info!("geosite build complete!"),
        Err(e) => {
            log::error!("{:?} error: {}", e.kind(), e);
            std::process::exit(1);
        }
    }
}

fn report_generate(summary: &GenerateSummary, config: &GeneratorConfig) {
    log::info!(
        "generated {} of {} categories into {:?}",
        summary.write.written,
        summary.normalized,
        config.output_dir
    );
}

fn merge_unless(skip_merge: bool, config: &GeneratorConfig) -> sing_geosite::Result<()> {
    if skip_merge {
        log::info!("skipping merged rule sets");
        return Ok(());
    }
    merge(config)
}

fn merge(config: &GeneratorConfig) -> sing_geosite::Result<()> {
    let MergeSummary { written, skipped } = run_merge(config)?;
    log::info!(
        "merged rule sets: {} written, {} skipped",
        written.len(),
        skipped.len()
    );
    Ok(())
}

fn build(config: &GeneratorConfig) -> sing_geosite::Result<GenerateSummary> {
    let client = ReleaseClient::from_config(config)?;
    run(&client, config)
}

fn convert(
    input: &PathBuf,
    checksum: Option<&PathBuf>,
    config: &GeneratorConfig,
) -> sing_geosite::Result<GenerateSummary> {
    log::info!("reading dataset {:?}", input);
    let data = fs::read(input)?;

    if let Some(path) = checksum {
        let expected = fs::read_to_string(path)?;
        verify_checksum(&data, &expected)?;
        log::info!("checksum verified against {:?}", path);
    }

    generate(&data, config)
}

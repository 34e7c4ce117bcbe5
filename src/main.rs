/*!
# Component Miner CLI

Command-line driver: reads documents, runs the extraction engine and renders
the reports.
*/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

use component_miner::cli_common::{
    self, format_duration, format_file_size, print_error, print_header, print_success,
    print_warning, OutputWriter,
};
use component_miner::core::read_document;
use component_miner::reports::{
    DocumentReport, ReportConfig, ReportFormat, ReportManager, TextReporter,
};
use component_miner::{ExtractionEngine, ExtractorConfig};

#[derive(Parser)]
#[command(
    name = "component-miner",
    version = env!("CARGO_PKG_VERSION"),
    about = "Finds duplicated markup blocks and synthesizes parameterized components"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract components from one or more documents
    Extract {
        /// Documents to analyze (each one is processed independently)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Extractor configuration (TOML, or YAML by extension)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Minimum number of lines a block must span
        #[arg(long)]
        min_block_lines: Option<usize>,

        /// Minimum number of identical blocks forming a cluster
        #[arg(long)]
        min_occurrences: Option<usize>,

        /// Maximum number of synthesized components per document
        #[arg(long)]
        max_components: Option<usize>,

        /// Maximum number of parameters per component
        #[arg(long)]
        max_params: Option<usize>,

        /// Output format (text, json)
        #[arg(short = 'f', long, default_value = "text")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print component bodies in text reports
        #[arg(long)]
        bodies: bool,

        /// Omit the occurrence map from text reports
        #[arg(long)]
        no_occurrences: bool,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Output file
        #[arg(short, long, default_value = "component-miner.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    if let Err(e) = cli_common::init_logging(cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let result = match cli.command {
        Commands::Extract {
            paths,
            config,
            min_block_lines,
            min_occurrences,
            max_components,
            max_params,
            format,
            output,
            bodies,
            no_occurrences,
            compact,
        } => {
            let overrides = Overrides {
                min_block_lines,
                min_occurrences,
                max_components,
                max_params,
            };
            let report_config = ReportConfig {
                format: ReportFormat::Text,
                include_bodies: bodies,
                include_occurrences: !no_occurrences,
                pretty: !compact,
                use_colors: !cli.no_color && output.is_none() && TextReporter::supports_colors(),
            };
            extract_command(
                &paths,
                config.as_deref(),
                overrides,
                &format,
                report_config,
                output.as_deref(),
            )
        }
        Commands::InitConfig { output, force } => init_config_command(&output, force),
    };

    if let Err(e) = result {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

/// Threshold overrides from the command line
struct Overrides {
    min_block_lines: Option<usize>,
    min_occurrences: Option<usize>,
    max_components: Option<usize>,
    max_params: Option<usize>,
}

impl Overrides {
    fn apply(self, mut config: ExtractorConfig) -> ExtractorConfig {
        if let Some(lines) = self.min_block_lines {
            config = config.with_min_block_lines(lines);
        }
        if let Some(occurrences) = self.min_occurrences {
            config = config.with_min_occurrences(occurrences);
        }
        if let Some(components) = self.max_components {
            config = config.with_max_components(components);
        }
        if let Some(params) = self.max_params {
            config = config.with_max_params(params);
        }
        config
    }
}

fn extract_command(
    paths: &[PathBuf],
    config_path: Option<&Path>,
    overrides: Overrides,
    format: &str,
    mut report_config: ReportConfig,
    output: Option<&Path>,
) -> Result<()> {
    report_config.format = format.parse::<ReportFormat>()?;

    let config = match config_path {
        Some(path) => ExtractorConfig::load(path)?,
        None => ExtractorConfig::default(),
    };
    let engine =
        ExtractionEngine::new(overrides.apply(config)).context("Invalid extractor configuration")?;

    if report_config.format == ReportFormat::Text && output.is_none() {
        print_header(
            "component-miner",
            env!("CARGO_PKG_VERSION"),
            "Duplicate block detection and component synthesis",
        );
    }

    let mut texts = Vec::with_capacity(paths.len());
    for path in paths {
        cli_common::validate_path(path, "Document")?;
        let text = read_document(path)
            .with_context(|| format!("Failed to read document: {}", path.display()))?;
        texts.push(text);
    }
    let total_bytes: usize = texts.iter().map(String::len).sum();

    let start = Instant::now();
    let reports = engine.extract_batch(&texts);
    let elapsed = start.elapsed();

    let documents: Vec<DocumentReport> = paths
        .iter()
        .zip(reports)
        .map(|(path, report)| DocumentReport::new(path.display().to_string(), report))
        .collect();

    let content = ReportManager::new().generate_report(&documents, &report_config)?;
    let mut writer = OutputWriter::create(output)?;
    writer.write_str(&content)?;
    writer.flush()?;

    let components: usize = documents.iter().map(|d| d.report.components.len()).sum();
    let diagnostics: usize = documents.iter().map(|d| d.report.diagnostics.len()).sum();

    print_success(&format!(
        "Processed {} documents ({}) in {}: {} components",
        documents.len(),
        format_file_size(total_bytes as u64),
        format_duration(elapsed),
        components
    ));
    if diagnostics > 0 {
        print_warning(&format!("{} diagnostics reported", diagnostics));
    }
    if let Some(path) = output {
        tracing::info!("Report written to {}", path.display());
    }

    Ok(())
}

fn init_config_command(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }
    ExtractorConfig::default().save_to_file(output)?;
    print_success(&format!("Default configuration written to {}", output.display()));
    Ok(())
}

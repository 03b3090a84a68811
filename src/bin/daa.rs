//! DAA - two-group microbiome differential abundance CLI
//!
//! Command-line interface for the Mann-Whitney / Benjamini-Hochberg analysis.

use clap::{Args, Parser, Subcommand, ValueEnum};
use flexi_logger::{DeferredNow, FlexiLoggerError, Logger, LoggerHandle};
use microbiome_assoc::config::{AnalysisConfig, LabelMode};
use microbiome_assoc::error::{DaaError, Result};
use microbiome_assoc::pipeline::{AnalysisReport, Pipeline};
use microbiome_assoc::report::{RenderedOutputs, ReportRenderer, SvgReportRenderer};
use std::path::PathBuf;

/// CLI-friendly label mode enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLabelMode {
    /// Label features passing the significance and fold-change thresholds
    Threshold,
    /// Label the N features with the smallest q-values
    Top,
    /// Label nothing
    None,
}

impl From<CliLabelMode> for LabelMode {
    fn from(mode: CliLabelMode) -> Self {
        match mode {
            CliLabelMode::Threshold => LabelMode::Threshold,
            CliLabelMode::Top => LabelMode::Top,
            CliLabelMode::None => LabelMode::None,
        }
    }
}

/// Two-group microbiome differential abundance analysis
#[derive(Parser)]
#[command(name = "daa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (error, warn, info, debug, trace); defaults to RUST_LOG or info
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two groups and write the results table and plots
    Run(RunArgs),

    /// Generate an example analysis configuration
    Example {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "analysis.yaml")]
        output: PathBuf,
    },
}

/// Flags of `run`. Every flag overrides the YAML config, which overrides the
/// built-in defaults.
#[derive(Args)]
struct RunArgs {
    /// Path to an analysis configuration YAML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the abundance table
    #[arg(short, long)]
    abundance: Option<PathBuf>,

    /// Path to the metadata table
    #[arg(short, long)]
    metadata: Option<PathBuf>,

    /// Field delimiter of both tables ("\t" or "tab" for TAB)
    #[arg(long)]
    sep: Option<String>,

    /// Metadata column holding the group labels
    #[arg(short, long)]
    group_col: Option<String>,

    /// Baseline group label
    #[arg(long)]
    group1: Option<String>,

    /// Comparison group label
    #[arg(long)]
    group2: Option<String>,

    /// Output directory
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// How to choose volcano plot labels
    #[arg(long, value_enum)]
    label_mode: Option<CliLabelMode>,

    /// Number of features labeled in top mode
    #[arg(long)]
    top_n: Option<usize>,

    /// Threshold on q-values instead of raw p-values
    #[arg(long)]
    use_q: bool,

    /// Raw p-value threshold
    #[arg(long)]
    p_thresh: Option<f64>,

    /// q-value (FDR) threshold
    #[arg(long)]
    q_thresh: Option<f64>,

    /// Absolute log2 fold-change threshold
    #[arg(long)]
    fc_thresh: Option<f64>,
}

impl RunArgs {
    /// Resolve the configuration: defaults, then YAML, then flags. Validation
    /// happens once, in `Pipeline::run_from_files`, before any input is read.
    fn into_config(self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => {
                log::info!("Loading analysis configuration from {:?}", path);
                AnalysisConfig::from_yaml_file(path)?
            }
            None => AnalysisConfig::default(),
        };

        if let Some(v) = self.abundance {
            config.abundance = v;
        }
        if let Some(v) = self.metadata {
            config.metadata = v;
        }
        if let Some(v) = self.sep {
            config.sep = v;
        }
        if let Some(v) = self.group_col {
            config.group_col = v;
        }
        if let Some(v) = self.group1 {
            config.group1 = v;
        }
        if let Some(v) = self.group2 {
            config.group2 = v;
        }
        if let Some(v) = self.out {
            config.out = v;
        }
        if let Some(v) = self.label_mode {
            config.label_mode = v.into();
        }
        if let Some(v) = self.top_n {
            config.top_n = v;
        }
        if self.use_q {
            config.use_q = true;
        }
        if let Some(v) = self.p_thresh {
            config.p_thresh = v;
        }
        if let Some(v) = self.q_thresh {
            config.q_thresh = v;
        }
        if let Some(v) = self.fc_thresh {
            config.fc_thresh = v;
        }

        Ok(config)
    }
}

/// Log line format: "YYYY-MM-DD HH:MM:SS [LEVEL] message"
fn log_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &log::Record,
) -> std::io::Result<()> {
    write!(
        w,
        "{} [{}] {}",
        now.now().format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.args()
    )
}

fn init_logging(level: Option<&str>) -> std::result::Result<LoggerHandle, FlexiLoggerError> {
    let logger = match level {
        Some(level) => Logger::try_with_str(level)?,
        None => Logger::try_with_env_or_str("info")?,
    };
    logger.format_for_stderr(log_format).start()
}

fn main() {
    let cli = Cli::parse();

    let _logger = match init_logging(cli.log_level.as_deref()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("Warning: logging disabled ({})", e);
            None
        }
    };

    let result = match cli.command {
        Commands::Run(args) => cmd_run(args),
        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        if let DaaError::SampleMismatch {
            missing_in_abundance,
            missing_in_metadata,
        } = &e
        {
            print_mismatch(missing_in_abundance, missing_in_metadata);
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_mismatch(missing_in_abundance: &[String], missing_in_metadata: &[String]) {
    eprintln!("WARNING: SampleID mismatch detected!");
    eprintln!();
    if !missing_in_abundance.is_empty() {
        eprintln!("Samples present in metadata but missing in abundance:");
        eprintln!("{:?}", missing_in_abundance);
    }
    if !missing_in_metadata.is_empty() {
        eprintln!();
        eprintln!("Samples present in abundance but missing in metadata:");
        eprintln!("{:?}", missing_in_metadata);
    }
    eprintln!();
}

/// Run the analysis and render every output
fn cmd_run(args: RunArgs) -> Result<()> {
    let config = args.into_config()?;
    let out_dir = config.out.clone();

    let report = Pipeline::new(config).run_from_files()?;
    let outputs = SvgReportRenderer.render(&report, &out_dir)?;

    print_summary(&report, &outputs);
    Ok(())
}

fn print_summary(report: &AnalysisReport, outputs: &RenderedOutputs) {
    let samples = &report.samples;
    println!("Analysis complete");
    println!(
        "Samples: {}={}, {}={}",
        samples.group1(),
        samples.n_group1(),
        samples.group2(),
        samples.n_group2()
    );
    println!("Features analyzed: {}", report.table.len());
    println!("Saved results table: {}", outputs.results_table.display());
    println!("Saved volcano plot: {}", outputs.volcano_plot.display());
    println!(
        "Labeled {} features on volcano plot (mode: {}).",
        report.labels.len(),
        report.labels.mode
    );
    let boxplot_features: Vec<&str> = outputs.boxplots.iter().map(|(f, _)| f.as_str()).collect();
    println!("Saved boxplots for: {}", boxplot_features.join(", "));
    println!("Saved run summary: {}", outputs.summary_json.display());

    println!("\nTop results:");
    println!("{}", report.table.preview(10));
    println!();
    print!("{}", report.table.summary());
}

/// Generate example analysis configuration
fn cmd_example(output_path: &PathBuf) -> Result<()> {
    let yaml = AnalysisConfig::default().to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example configuration to {:?}", output_path);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);

    Ok(())
}

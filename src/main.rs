use anomaly_scan::export::ScanExport;
use anomaly_scan::rules::RuleBook;
use anomaly_scan::{AnomalyEngine, InvariantSet, ScanConfiguration, ScanOrchestrator, ScanReport, Spectrum};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "anomaly-scan")]
#[command(about = "Exact anomaly cancellation checks and extension scans for SU(3)×SU(2)×U(1)_Y")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a spectrum and print the anomaly report
    Check {
        /// Built-in spectrum to check (ignored when --spectrum is given)
        #[arg(long, value_enum, default_value_t = BaseModel::Sm)]
        model: BaseModel,

        /// JSON file holding a list of fermions
        #[arg(long)]
        spectrum: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Invariants::Standard)]
        invariants: Invariants,

        /// Rule file to validate the spectrum against (with --rule)
        #[arg(long, requires = "rule")]
        rules: Option<PathBuf>,

        /// Rule whose constraints the spectrum must satisfy
        #[arg(long, requires = "rules")]
        rule: Option<String>,
    },
    /// Scan for anomaly-free extensions
    Scan {
        /// Rule file; without it the built-in default scan of the SM runs
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Run only this rule (default: every rule in the file)
        #[arg(long)]
        rule: Option<String>,

        /// Stop after this many accepted models
        #[arg(long)]
        limit: Option<usize>,

        /// Override k_max of grid hypercharge constraints
        #[arg(long)]
        hyper_max: Option<i64>,

        /// Narrow grid and representation sets
        #[arg(long)]
        quick: bool,

        /// Export file (single scan) or directory (several scans)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the rules of a rule file, or export one as JSON
    Rules {
        rules: PathBuf,

        /// Rule to export as its resolved configuration
        #[arg(long, requires = "output")]
        export: Option<String>,

        /// Destination of the exported rule
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BaseModel {
    /// One generation of the Standard Model
    Sm,
    /// Standard Model plus a right-handed neutrino
    SmNu,
}

#[derive(Clone, Copy, ValueEnum)]
enum Invariants {
    Standard,
    ChiralityBalanced,
}

impl From<Invariants> for InvariantSet {
    fn from(value: Invariants) -> Self {
        match value {
            Invariants::Standard => InvariantSet::Standard,
            Invariants::ChiralityBalanced => InvariantSet::ChiralityBalanced,
        }
    }
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Check {
            model,
            spectrum,
            invariants,
            rules,
            rule,
        } => run_check(model, spectrum, invariants, rules.zip(rule)),
        Commands::Scan { rules, rule, limit, hyper_max, quick, output } => {
            run_scan(rules, rule, limit, hyper_max, quick, output)
        }
        Commands::Rules { rules, export, output } => match export.zip(output) {
            Some((name, output)) => export_rule(&rules, &name, &output),
            None => list_rules(&rules),
        },
    }
}

fn run_check(
    model: BaseModel,
    spectrum: Option<PathBuf>,
    invariants: Invariants,
    rule: Option<(PathBuf, String)>,
) -> Result<()> {
    let spectrum = match spectrum {
        Some(path) => {
            let file = File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
            serde_json::from_reader::<_, Spectrum>(BufReader::new(file))
                .with_context(|| format!("Failed to parse spectrum {}", path.display()))?
        }
        None => Spectrum::standard_model(matches!(model, BaseModel::SmNu)),
    };

    let engine = AnomalyEngine::new(invariants.into());
    println!("{}", engine.report(&spectrum));

    let mut violations = Vec::new();
    if let Some((path, name)) = rule {
        let book = RuleBook::from_path(&path).with_context(|| format!("Failed to load rules {}", path.display()))?;
        violations = book.validate_fermion_set(&name, spectrum.fermions())?;
        if violations.is_empty() {
            println!("\nSpectrum satisfies rule '{}'", name);
        } else {
            println!("\nRule '{}' violations:", name);
            for violation in &violations {
                println!("  ✗ {}", violation);
            }
        }
    }

    if !engine.verify(&spectrum).all_vanish {
        anyhow::bail!("spectrum is not anomaly-free");
    }
    if !violations.is_empty() {
        anyhow::bail!("spectrum violates {} rule constraint(s)", violations.len());
    }
    Ok(())
}

fn run_scan(
    rules: Option<PathBuf>,
    rule: Option<String>,
    limit: Option<usize>,
    hyper_max: Option<i64>,
    quick: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let configs: Vec<(String, anomaly_scan::Result<ScanConfiguration>)> = match rules {
        Some(path) => {
            let book = RuleBook::from_path(&path).with_context(|| format!("Failed to load rules {}", path.display()))?;
            match rule {
                Some(name) => vec![(name.clone(), book.configuration(&name))],
                None => book.configurations(),
            }
        }
        None => vec![(
            "default".to_string(),
            Ok(ScanConfiguration::new("default", Spectrum::standard_model(false))),
        )],
    };

    let mut runnable = Vec::new();
    let mut failures = 0;
    for (name, config) in configs {
        match config {
            Ok(mut config) => {
                if quick {
                    config = config.quick();
                }
                if let Some(k_max) = hyper_max {
                    config = config.with_hyper_max(k_max);
                }
                if limit.is_some() {
                    config.limit = limit;
                }
                runnable.push(config);
            }
            Err(e) => {
                error!("Rule '{}' is invalid: {}", name, e);
                failures += 1;
            }
        }
    }

    let single = runnable.len() == 1;
    let used: Vec<ScanConfiguration> = runnable.clone();
    let total = runnable.len() + failures;

    for ((name, result), config) in ScanOrchestrator::run_batch(runnable).into_iter().zip(&used) {
        match result {
            Ok(report) => {
                println!("{}\n", report.summary());
                print_models(&report);
                if let Some(output) = &output {
                    let path = export_path(output, &name, single)?;
                    ScanExport::from_report(&report, config).write_json(&path)?;
                }
            }
            Err(e) => {
                error!("Scan '{}' failed: {}", name, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} scans failed", failures, total);
    }
    info!("All {} scans completed", total);
    Ok(())
}

fn print_models(report: &ScanReport) {
    for (i, model) in report.models.iter().enumerate() {
        println!("{:>4}. [{}] {}", i + 1, model.block, model.description);
    }
    if report.truncated {
        println!("      ... truncated");
    }
    println!();
}

fn export_path(output: &Path, name: &str, single: bool) -> Result<PathBuf> {
    if single {
        return Ok(output.to_path_buf());
    }
    std::fs::create_dir_all(output).with_context(|| format!("Failed to create {}", output.display()))?;
    Ok(output.join(format!("{}.json", name)))
}

fn export_rule(path: &Path, name: &str, output: &Path) -> Result<()> {
    let book = RuleBook::from_path(path).with_context(|| format!("Failed to load rules {}", path.display()))?;
    book.export_rule(name, output)?;
    Ok(())
}

fn list_rules(path: &Path) -> Result<()> {
    let book = RuleBook::from_path(path).with_context(|| format!("Failed to load rules {}", path.display()))?;
    println!("Rules in {}:", path.display());
    for (name, description) in book.list_rules() {
        if description.is_empty() {
            println!("  {}", name);
        } else {
            println!("  {:<28} {}", name, description);
        }
    }
    Ok(())
}

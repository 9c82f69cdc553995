use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use std::path::PathBuf;
use tracing::debug;

use solaudit_estimator::{
    Estimate, EstimateError, Estimator, ImportCounting, ScoringMode, SignalAggregation,
    SourceDocument, WeightConfig,
};

use super::RuntimeArgs;

#[derive(Args, Debug)]
pub struct EstimateArgs {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Weight overlay (JSON, or YAML for .yaml/.yml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Optimizer runs; 0 disables the optimizer
    #[arg(long)]
    pub optimizer_runs: Option<u32>,

    /// Charge every import statement instead of one flat import rate
    #[arg(long)]
    pub count_imports: bool,

    /// How document-wide signals are counted: per-unit or once
    #[arg(long, default_value = "per-unit", value_parser = parse_aggregation)]
    pub aggregate: SignalAggregation,

    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub runtime: RuntimeArgs,
}

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

fn parse_aggregation(s: &str) -> Result<SignalAggregation, String> {
    match s.to_lowercase().as_str() {
        "per-unit" => Ok(SignalAggregation::PerUnit),
        "once" => Ok(SignalAggregation::Once),
        _ => Err(format!("Unknown aggregation: {} (expected per-unit or once)", s)),
    }
}

pub async fn execute(args: EstimateArgs) -> Result<()> {
    let document = SourceDocument::read(&args.input)?;
    let weights = WeightConfig::load(args.config.as_deref())?;

    let mut config = args.runtime.config();
    if let Some(runs) = args.optimizer_runs {
        config.optimizer_runs = runs;
    }
    config.scoring = ScoringMode {
        import_counting: if args.count_imports {
            ImportCounting::PerImport
        } else {
            ImportCounting::FlatRate
        },
        signal_aggregation: args.aggregate,
    };

    debug!(
        "Catalog {}, compilers in {}, optimizer runs {}, scoring {:?}",
        config.catalog_url(),
        config.solc_dir.display(),
        config.optimizer_runs,
        config.scoring
    );
    let estimator = Estimator::from_config(&config, weights)?;

    let estimate = match estimator.estimate(&document).await {
        Ok(estimate) => estimate,
        Err(err @ EstimateError::CompileDiagnostics(_)) => {
            report_diagnostics(&err);
            anyhow::bail!("compilation of {} failed", args.input.display());
        }
        Err(err) => return Err(err.into()),
    };

    let output = match args.format {
        OutputFormat::Text => generate_text_output(&estimate),
        OutputFormat::Json => serde_json::to_string_pretty(&estimate)?,
    };

    if let Some(output_path) = args.output {
        std::fs::write(&output_path, output)
            .with_context(|| format!("Failed to write report: {:?}", output_path))?;
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn report_diagnostics(err: &EstimateError) {
    for diagnostic in err.diagnostics() {
        let label = if diagnostic.is_error() {
            diagnostic.severity.to_string().red().bold()
        } else {
            diagnostic.severity.to_string().yellow().bold()
        };
        eprintln!("{}: {}", label, diagnostic.display_message().trim_end());
    }
}

fn generate_text_output(estimate: &Estimate) -> String {
    let mut out = String::new();
    let breakdown = &estimate.breakdown;
    let signals = &estimate.signals;

    out.push_str(&format!("{}\n", "⏱️  Audit Time Estimate".bright_blue().bold()));
    out.push_str(&format!("{}\n", "=".repeat(50).bright_blue()));
    out.push_str(&format!("📁 Source: {}\n", estimate.source));
    out.push_str(&format!(
        "🔧 Compiler: {} (declared {})\n",
        estimate.compiler, estimate.constraint
    ));

    let units = estimate.artifact.unit_names();
    let unit_list = if units.is_empty() {
        "none".to_string()
    } else {
        units.join(", ")
    };
    out.push_str(&format!("📦 Units: {}\n", unit_list));
    for (name, unit) in estimate.artifact.units() {
        out.push_str(&format!("   • {}: {} function(s)\n", name, unit.function_count()));
    }

    out.push_str(&format!("\n{}\n", "📊 Signals".cyan()));
    out.push_str(&format!("   Lines: {} ({:?})\n", signals.line_count, estimate.size_class));
    out.push_str(&format!("   External calls: {}\n", signals.external_calls));
    out.push_str(&format!("   Imports: {}\n", signals.imports));
    out.push_str(&format!("   Inline assembly: {}\n", yes_no(signals.has_assembly)));
    out.push_str(&format!("   Upgradeability markers: {}\n", yes_no(signals.has_upgrade_markers)));

    out.push_str(&format!("\n{}\n", "🧮 Breakdown".cyan()));
    out.push_str(&format!("   Base time:           {:>8.2} h\n", breakdown.base_time));
    out.push_str(&format!("   Complexity time:     {:>8.2} h\n", breakdown.complexity_time));
    out.push_str(&format!("   Upgradeability time: {:>8.2} h\n", breakdown.upgradeability_time));
    out.push_str(&format!(
        "   {}               {}\n",
        "Total:".bold(),
        format!("{:>8.2} h", breakdown.total).green().bold()
    ));

    out
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aggregation() {
        assert_eq!(parse_aggregation("per-unit").unwrap(), SignalAggregation::PerUnit);
        assert_eq!(parse_aggregation("ONCE").unwrap(), SignalAggregation::Once);
        assert!(parse_aggregation("twice").is_err());
    }

    #[test]
    fn test_parse_output_format() {
        assert!(matches!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!(matches!("Text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!("markdown".parse::<OutputFormat>().is_err());
    }
}

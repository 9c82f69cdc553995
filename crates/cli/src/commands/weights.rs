use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use solaudit_estimator::weights::EXAMPLE_OVERLAY;
use solaudit_estimator::WeightConfig;

#[derive(Args, Debug)]
pub struct WeightsArgs {
    /// Weight overlay to apply over the defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long, default_value = "yaml")]
    pub format: WeightsFormat,

    /// Print an example overlay instead of the weight table
    #[arg(long, conflicts_with = "config")]
    pub example: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum WeightsFormat {
    Yaml,
    Json,
}

impl std::str::FromStr for WeightsFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(WeightsFormat::Yaml),
            "json" => Ok(WeightsFormat::Json),
            _ => Err(format!("Unknown weights format: {}", s)),
        }
    }
}

pub fn execute(args: WeightsArgs) -> Result<()> {
    if args.example {
        print!("{}", EXAMPLE_OVERLAY);
        return Ok(());
    }

    let weights = WeightConfig::load(args.config.as_deref())?;

    let rendered = match args.format {
        WeightsFormat::Yaml => weights.to_yaml()?,
        WeightsFormat::Json => weights.to_json()?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

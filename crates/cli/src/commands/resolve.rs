use anyhow::Result;
use clap::Args;
use colored::*;
use std::path::PathBuf;

use solaudit_estimator::{Estimator, SourceDocument, WeightConfig};

use super::RuntimeArgs;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[command(flatten)]
    pub runtime: RuntimeArgs,
}

pub async fn execute(args: ResolveArgs) -> Result<()> {
    let document = SourceDocument::read(&args.input)?;
    let estimator = Estimator::from_config(&args.runtime.config(), WeightConfig::default())?;

    let (constraint, version) = estimator.resolve(&document).await?;

    println!("📁 {}", args.input.display());
    println!("   Declared: {}", constraint);
    println!("   Catalog key: {}", constraint.key());
    println!("   Build: {}", version.build().green());
    Ok(())
}

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error};

use protein_scout::{AnalysisResult, AppConfig, ImageInput, MenuAnalyzer};

#[derive(Parser)]
#[command(name = "protein-scout")]
#[command(about = "Find the highest-protein item on a menu photo")]
#[command(version)]
struct Cli {
    /// Menu photo (png, jpeg, gif, webp, bmp or tiff)
    image: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// LLM model to use instead of the configured one
    #[arg(short, long)]
    model: Option<String>,

    /// Configuration file (defaults to ./protein-scout.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    for warning in config.diagnostics() {
        eprintln!("Warning: {}", warning);
    }

    let image = ImageInput::from_path(&cli.image).await?;

    let mut builder = MenuAnalyzer::builder().config(config);
    if let Some(model) = cli.model {
        builder = builder.model(model);
    }
    let analyzer = builder.build()?;

    if !cli.json {
        eprintln!("Analyzing {}...", cli.image.display());
    }
    let result = analyzer.analyze(&image).await;
    analyzer.dispose().await;

    let result = result.inspect_err(|e| error!("Analysis failed: {:?}", e))?;
    debug!("{:#?}", result);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    Ok(())
}

fn print_result(result: &AnalysisResult) {
    println!("Highest protein: {}", result.menu_item);
    println!("  Protein:  {} g", result.macros.protein);
    println!("  Carbs:    {} g", result.macros.carbs);
    println!("  Fat:      {} g", result.macros.fat);
    println!("  Calories: {} kcal", result.macros.calories);

    if result.is_fallback {
        println!();
        println!("Note: menu analysis was unavailable, these numbers are a placeholder estimate.");
    }
}

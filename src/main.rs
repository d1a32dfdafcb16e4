use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use medi::config::Settings;
use medi::server::{ApiServer, AppState};
use medi::shell;
use medi::symptoms::SAMPLE_SYMPTOMS;

/// Medical image and symptom analysis API
#[derive(Parser)]
#[command(name = "medi", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server and an interactive shell (default)
    Run,
    /// Start only the API server
    Serve,
    /// Write the condition catalog to disk and try it on sample symptoms
    InitCatalog {
        /// Where to write the catalog, defaults to the configured catalog_path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Main entry point for the medi application
///
/// Handles three modes of operation:
/// - Run: Starts the API server in the background and an interactive shell
/// - Serve: Starts only the API server
/// - InitCatalog: Writes the condition catalog and smoke-tests the symptom analyzer
///
/// # Errors
/// Returns an error if settings are invalid, the models cannot be set up, or
/// the server fails to bind
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    // Load settings first
    let settings = Settings::new()?;

    // Initialize the subscriber before anything else logs
    let log_path = settings.logging.file.as_deref().unwrap_or_else(|| Path::new("logs"));
    std::fs::create_dir_all(log_path)?;
    let file_appender = tracing_appender::rolling::RollingFileAppender::new(
        tracing_appender::rolling::Rotation::DAILY,
        log_path,
        "medi",
    );
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=debug", settings.logging.level)));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        // Disable ANSI colors for cleaner log files
        .with_ansi(false)
        .with_line_number(true)
        .with_file(true)
        .with_thread_ids(true)
        .with_target(false)
        .with_env_filter(filter)
        .init();

    info!("Medi starting up...");
    let full_log_path = std::fs::canonicalize(log_path)?;
    info!("Log directory: {}", full_log_path.display());
    info!("Settings loaded");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Serve => {
            let state = AppState::from_settings(&settings)?;
            let server = ApiServer::new(state, settings.server.clone());
            println!("Serving on {}:{}", settings.server.host, settings.server.port);
            server.start().await?;
        }
        Commands::Run => {
            let state = AppState::from_settings(&settings)?;
            let server = ApiServer::new(state, settings.server.clone());

            // Start server in a separate task
            tokio::spawn(async move {
                if let Err(e) = server.start().await {
                    eprintln!("Server error: {}", e);
                }
            });

            // Give the server a moment to start
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

            shell::shell_loop(&settings).await?;
        }
        Commands::InitCatalog { output } => {
            init_catalog(&settings, output).await?;
        }
    }

    Ok(())
}

/// Saves the active condition catalog and runs the sample descriptions through
/// the configured symptom analyzer.
async fn init_catalog(settings: &Settings, output: Option<PathBuf>) -> Result<(), Box<dyn Error + Send + Sync>> {
    let path = output
        .or_else(|| settings.models.symptoms.catalog_path.clone())
        .unwrap_or_else(|| PathBuf::from("models/condition_catalog.json"));

    let state = AppState::from_settings(settings)?;
    let analyzer = &state.symptoms;
    analyzer.catalog().save(&path)?;
    println!("Condition catalog saved to {}", path.display());
    info!("Condition catalog saved to {}", path.display());

    println!("\nTesting the symptom analyzer with sample symptoms:");
    for symptoms in SAMPLE_SYMPTOMS {
        let result = analyzer.analyze(symptoms).await;
        println!("\nSymptoms: {}", symptoms);
        println!("Diagnosis: {}", result.diagnosis);
        println!("Confidence: {:.1}%", result.confidence);
        println!("Recommendation: {}", result.recommendation);
        println!("Model used: {}", result.model_used);

        if let Some(differential) = &result.differential_diagnosis {
            println!("Differential diagnosis:");
            for (condition, confidence) in differential {
                println!("  - {}: {:.1}%", condition, confidence);
            }
        }
        if let Some(error) = &result.model_error {
            println!("Model error: {}", error);
        }
    }

    Ok(())
}

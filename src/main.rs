//! CIFAR-10 Classifier CLI
//!
//! Entry point for serving the classifier over HTTP or running it on a single
//! image from the command line.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use cifar10_classifier::backend::{backend_name, default_device, DefaultBackend};
use cifar10_classifier::inference::{BurnClassifier, Classifier, Predictor};
use cifar10_classifier::model::load_classifier;
use cifar10_classifier::server::{self, AppState, ServerConfig};
use cifar10_classifier::utils::logging::{init_logging, LogConfig, LogLevel};

/// CIFAR-10 image classification service
#[derive(Parser, Debug)]
#[command(name = "cifar10_classifier")]
#[command(version)]
#[command(about = "Serve a pre-trained CIFAR-10 classifier built with Burn", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CIFAR10_LOG_LEVEL", default_value = "info")]
    log_level: LogLevel,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Host to bind to
        #[arg(long, env = "CIFAR10_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "CIFAR10_PORT", default_value = "8000")]
        port: u16,

        /// Path to the trained model weights
        #[arg(short, long, env = "CIFAR10_MODEL_PATH", default_value = "models/cifar10_cnn.mpk")]
        model: PathBuf,

        /// Optional JSON file describing the model architecture
        #[arg(long, env = "CIFAR10_MODEL_CONFIG")]
        model_config: Option<PathBuf>,

        /// Directory for temporary uploads
        #[arg(long, env = "CIFAR10_UPLOAD_DIR", default_value = "uploads")]
        upload_dir: PathBuf,

        /// Allowed CORS origin (repeatable)
        #[arg(
            long = "allowed-origin",
            env = "CIFAR10_ALLOWED_ORIGINS",
            value_delimiter = ',',
            default_values_t = server::DEFAULT_ALLOWED_ORIGINS.map(String::from)
        )]
        allowed_origins: Vec<String>,

        /// Maximum upload size in MiB
        #[arg(long, env = "CIFAR10_MAX_UPLOAD_MB", default_value = "10")]
        max_upload_mb: usize,
    },

    /// Classify a single image file
    Predict {
        /// Path to input image
        #[arg(short, long)]
        input: PathBuf,

        /// Path to the trained model weights
        #[arg(short, long, env = "CIFAR10_MODEL_PATH", default_value = "models/cifar10_cnn.mpk")]
        model: PathBuf,

        /// Optional JSON file describing the model architecture
        #[arg(long, env = "CIFAR10_MODEL_CONFIG")]
        model_config: Option<PathBuf>,

        /// Number of predictions to show
        #[arg(short = 'k', long, default_value = "3")]
        top_k: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default().with_level(cli.log_level)
    };
    init_logging(&log_config).map_err(anyhow::Error::msg)?;

    info!("CIFAR-10 Classifier v{}", cifar10_classifier::VERSION);

    match cli.command {
        Commands::Serve {
            host,
            port,
            model,
            model_config,
            upload_dir,
            allowed_origins,
            max_upload_mb,
        } => {
            let config = ServerConfig {
                host,
                port,
                model_path: model,
                model_config,
                upload_dir,
                allowed_origins,
                max_upload_bytes: server::upload_limit_bytes(max_upload_mb)?,
            };
            run_server(config)
        }
        Commands::Predict {
            input,
            model,
            model_config,
            top_k,
        } => run_predict(&input, &model, model_config.as_deref(), top_k),
    }
}

/// Load the model once; a missing or incompatible file aborts startup
fn load_model(model: &Path, model_config: Option<&Path>) -> Result<Arc<dyn Classifier>> {
    let device = default_device();
    info!("Backend: {}", backend_name());

    let model = load_classifier::<DefaultBackend>(model, model_config, &device)
        .with_context(|| format!("Could not load model from {:?}", model))?;
    Ok(Arc::new(BurnClassifier::new(model, device)))
}

fn run_server(config: ServerConfig) -> Result<()> {
    info!("Configuration:");
    info!("  Model path:      {:?}", config.model_path);
    info!("  Model config:    {:?}", config.model_config);
    info!("  Upload dir:      {:?}", config.upload_dir);
    info!("  Allowed origins: {}", config.allowed_origins.join(", "));
    info!("  Max upload:      {} bytes", config.max_upload_bytes);

    let classifier = load_model(&config.model_path, config.model_config.as_deref())?;
    info!("Classifier ready: {}", classifier.describe());

    let state = Arc::new(AppState::new(config, classifier).context("Failed to prepare upload directory")?);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(server::serve(state))
}

fn run_predict(input: &Path, model: &Path, model_config: Option<&Path>, top_k: usize) -> Result<()> {
    println!("{}", "Loading model...".cyan());
    let classifier = load_model(model, model_config)?;
    let predictor = Predictor::new(classifier).with_top_k(top_k);

    println!("{}", format!("Classifying {:?}...", input).cyan());
    let result = predictor
        .predict_file(input)
        .with_context(|| format!("Failed to classify {:?}", input))?;

    println!();
    println!("{}", "Result".green().bold());
    print!("{}", result.display());
    Ok(())
}

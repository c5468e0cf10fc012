use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tunway::config::{load_config, AppConfig, ConfigWatcher, SharedConfig};

#[derive(Parser)]
#[command(name = "tunway-cli")]
#[command(about = "Configuration tool for the tunway redirector", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a configuration file
    Check { file: PathBuf },
    /// Resolve the upstream proxy endpoint for a consumer
    Resolve {
        file: PathBuf,
        /// Proxy name to resolve; defaults to the DNS egress proxy
        #[arg(short, long)]
        consumer: Option<String>,
    },
    /// Print the built-in default configuration as TOML
    Defaults,
    /// Watch a configuration file and re-validate on every change
    Watch { file: PathBuf },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tunway=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file } => match load_config(&file) {
            Ok(config) => {
                println!(
                    "ok: {} proxies, {} patterns, {} routes",
                    config.proxy.len(),
                    config.pattern.len(),
                    config.route.specs.len()
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Resolve { file, consumer } => {
            let config = match load_config(&file) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            let result = match &consumer {
                Some(name) => config.proxy_for(name),
                None => config.dns_egress_proxy(),
            };
            match result {
                Ok(endpoint) => {
                    println!("{}", endpoint);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Defaults => match toml::to_string_pretty(&AppConfig::default()) {
            Ok(text) => {
                print!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Watch { file } => {
            let config = match load_config(&file) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            let shared = SharedConfig::new(config);

            let (watcher, mut updates) = ConfigWatcher::new(&file);
            // keep the notify handle alive for the lifetime of the loop
            let _watcher = match watcher.run() {
                Ok(w) => w,
                Err(e) => {
                    eprintln!("error: {}", e);
                    return ExitCode::FAILURE;
                }
            };

            tracing::info!(path = %file.display(), "watching for configuration changes");
            while let Some(new_config) = updates.recv().await {
                shared.store(new_config);
                let current = shared.load();
                match current.dns_egress_proxy() {
                    Ok(endpoint) => {
                        tracing::info!(dns_proxy = %endpoint, "configuration reloaded")
                    }
                    Err(e) => tracing::warn!(error = %e, "configuration reloaded"),
                }
            }
            ExitCode::SUCCESS
        }
    }
}

use clap::Parser;
use qms::cli::{Cli, Commands};
use qms::types::config::Config;
use qms::{QmsError, QmsResult};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> QmsResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet). An explicit file that fails to load is fatal.
    let config = if cli.config.exists() {
        Config::load(&cli.config)
            .map_err(|e| QmsError::config(format!("{}: {}", cli.config.display(), e)))?
    } else {
        Config::load_or_default()
    };

    // CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("qms={}", log_level)
            .parse()
            .unwrap_or_else(|_| "qms=info".parse().expect("fallback directive is valid")),
    );

    let json_logs = config.general.log_format.eq_ignore_ascii_case("json");
    tracing_subscriber::registry()
        .with(filter)
        .with(json_logs.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json_logs).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            qms::cli::commands::init(path).await?;
        }
        Commands::Import { input } => {
            qms::cli::commands::import(&input, &config).await?;
        }
        Commands::Summary { json } => {
            qms::cli::commands::summary(json, &config).await?;
        }
        Commands::Sheet { id } => {
            qms::cli::commands::sheet(&id, &config).await?;
        }
        Commands::DeleteSheet { id, yes } => {
            qms::cli::commands::delete_sheet(&id, yes, &config).await?;
        }
        Commands::Lookups => {
            qms::cli::commands::lookups(&config).await?;
        }
        Commands::Version => {
            qms::cli::commands::version();
        }
    }

    Ok(())
}

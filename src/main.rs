use clap::Parser;

use slotbook::cli::{Cli, Commands};
use slotbook::config::init_config_from;
use slotbook::errors::SlotbookError;
use slotbook::runtime::modes::{generate_config, run_server};
use slotbook::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::GenerateConfig { output } => generate_config(output.as_deref()),
        Commands::Serve => {
            let config = init_config_from(&cli.config);

            let _guard = match init_logging(&config.logging) {
                Ok(guard) => guard,
                Err(e) => {
                    let err = SlotbookError::config(e.to_string());
                    eprintln!("{}", err.format_colored());
                    std::process::exit(1);
                }
            };

            tracing::info!(
                "Starting slotbook {} (config: {})",
                env!("CARGO_PKG_VERSION"),
                cli.config
            );
            run_server(&config).await
        }
    }
}

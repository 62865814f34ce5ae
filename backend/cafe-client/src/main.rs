use cafe_client::{app, cli::Cli, configs, logger};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = configs::Config::new_with_config_path(cli.config.clone())?;
    logger::setup(
        &config.log,
        cafe_client::service_name!(),
        [
            "cafe_client",
            "checkout",
            "external_services",
            "khqr",
        ],
    )?;
    logger::debug!(environment = %config.common.environment, "configuration loaded");

    let state = app::AppState::new(config);
    if let Err(report) = app::run(state, cli.command).await {
        logger::error!(error = ?report, "command failed");
        return Err(report.current_context().clone().into());
    }
    Ok(())
}

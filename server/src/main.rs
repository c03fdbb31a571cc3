use clap::Parser;
use env_logger::Env;
use log::{error, info};
use server::config::Config;
use server::network::{Server, ServerMessage};

/// Main-method of the application.
/// Parses command-line arguments, binds the listener and runs the server
/// loop until Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    info!(
        "Turn delays: roll {}ms, buy {}ms, skip {}ms",
        config.roll_delay_ms, config.buy_delay_ms, config.skip_delay_ms
    );

    let server = Server::new(&config).await?;
    let shutdown = server.sender();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        info!("Received Ctrl+C, shutting down gracefully...");
        let _ = shutdown.send(ServerMessage::Shutdown);
    });

    server.run().await?;

    Ok(())
}

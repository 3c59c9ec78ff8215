//! CLI for heatsub
//!
//! Subcommands:
//! - `server`: run the MQTT relay and the HTTP server (static UI, snapshot, `/ws` feed)
//! - `watch`: connect as a client and print live updates

use std::time::Duration;

use clap::{Parser, Subcommand};
use heatsub::config::load_config;
use heatsub::http::start_http_server;
use heatsub::hub::Hub;
use heatsub::ingest::run_ingest_loop;
use heatsub::utils::{Error, logging};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "heatsub", version, about = "MQTT sensor readings to live heatmap clients")]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the relay (default)
    Server,
    /// Connect to a running relay, say hello and print every update
    Watch {
        /// WebSocket URL of the relay
        #[arg(long, default_value = "ws://127.0.0.1:3000/ws")]
        url: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match cli.command.unwrap_or(Command::Server) {
        Command::Server => {
            if let Err(e) = run_server().await {
                error!("Server failed: {e}");
                std::process::exit(1);
            }
        }
        Command::Watch { url } => {
            if let Err(e) = run_watch(&url).await {
                error!("Watch failed: {e}");
                std::process::exit(1);
            }
        }
    }
}

async fn run_server() -> Result<(), Error> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!("Could not read .env: {e}");
        }
    }
    let config = load_config()?;
    config.points.warn_missing_topics();

    let registry = config.points.registry();
    let hub = Hub::spawn(
        registry,
        config.mqtt.layout,
        Duration::from_secs(config.points.expiry_secs),
    );

    let http_addr = format!("{}:{}", config.server.host, config.server.port);

    tokio::select! {
        res = run_ingest_loop(hub.clone(), config.mqtt.clone()) => res?,
        res = start_http_server(http_addr, hub, config.server.static_dir.clone()) => res?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}

async fn run_watch(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    use futures_util::{SinkExt, StreamExt};
    use heatsub::transport::{ClientMessage, ServerMessage};
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    let (mut ws_stream, _response) = connect_async(url).await?;
    info!("Connected to {url}");

    let hello = serde_json::to_string(&ClientMessage::Hello)?;
    ws_stream.send(WsMessage::Text(hello.into())).await?;

    while let Some(msg) = ws_stream.next().await {
        let msg = msg?;
        if !msg.is_text() {
            continue;
        }
        match serde_json::from_str::<ServerMessage>(msg.to_text()?) {
            Ok(ServerMessage::TemperatureUpdate { index, data }) => {
                println!("point {index:>2} temperature {}", format_reading(data, "°C"));
            }
            Ok(ServerMessage::HumidityUpdate { index, data }) => {
                println!("point {index:>2} humidity    {}", format_reading(data, "%"));
            }
            Err(e) => warn!("Unexpected frame: {e}"),
        }
    }

    info!("Connection closed");
    Ok(())
}

fn format_reading(data: Option<f64>, unit: &str) -> String {
    match data {
        Some(v) => format!("{v:.1}{unit}"),
        None => "-".to_string(),
    }
}

use std::sync::Arc;
use async_trait::async_trait;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use cmdext_common::models::Role;
use cmdext_common::traits::ChatSink;
use cmdext_core::runtime::LocalBotRuntime;
use cmdext_core::settings::Settings;
use cmdext_core::{CommandsExtension, Error};

#[derive(Parser, Debug, Clone)]
#[command(name = "cmdext")]
#[command(author, version, about = "Dynamic chat commands and scheduled messages with a web UI")]
struct Args {
    /// Settings file with `{"Settings": {"WebServerPort": N}}`
    #[arg(long, default_value = "appsettings.json")]
    settings: String,

    /// SQLite database file
    #[arg(long, default_value = "PluginData/commandextensionsplugin.db")]
    db_path: String,

    /// Channel that scheduled messages are broadcast to
    #[arg(long, default_value = "console")]
    channel: String,

    /// Override the web server port from the settings file
    #[arg(long)]
    port: Option<u16>,
}

/// Prints whatever the bot says to stdout.
struct StdoutChatSink;

#[async_trait]
impl ChatSink for StdoutChatSink {
    async fn send_message(&self, channel: &str, text: &str) -> Result<(), Error> {
        println!("[#{}] bot: {}", channel, text);
        Ok(())
    }
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("cmdext=info".parse().unwrap_or_default());
    fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!("cmdext starting. db={}, channel={}", args.db_path, args.channel);

    let mut settings = Settings::load(&args.settings);
    if let Some(port) = args.port {
        settings.web_server_port = port;
    }

    let runtime = Arc::new(LocalBotRuntime::new(args.channel.clone(), Arc::new(StdoutChatSink)));
    let mut extension = CommandsExtension::initialize(&args.db_path, runtime.clone(), &settings).await?;

    println!("Type chat lines (e.g. !hello). Ctrl-C to quit.");
    run_console(&runtime, &args.channel).await;

    extension.shutdown().await;
    runtime.shutdown();
    info!("Goodbye!");
    Ok(())
}

/// Feed stdin lines to the runtime as broadcaster chat until EOF or Ctrl-C.
async fn run_console(runtime: &LocalBotRuntime, channel: &str) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received, shutting down");
                break;
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(text)) => {
                        if let Err(e) = runtime.handle_chat_message(channel, "console", Role::Broadcaster, &text).await {
                            error!("Chat handling failed: {}", e);
                        }
                    }
                    Ok(None) => {
                        // stdin closed; keep serving until Ctrl-C.
                        if let Err(e) = tokio::signal::ctrl_c().await {
                            error!("Failed to listen for Ctrl-C: {}", e);
                        }
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read stdin: {}", e);
                        break;
                    }
                }
            }
        }
    }
}

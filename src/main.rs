use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use garment_assist::channels::{ChannelManager, CliChannel, WebChannel};
use garment_assist::config::DeskConfig;
use garment_assist::desk::SupportDesk;
use garment_assist::responder::ResponseMatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DeskConfig::from_env().context("Invalid GARMENT_ASSIST_* configuration")?;

    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = init_tracing(&config);

    let table = config
        .load_rule_table()
        .context("Failed to load rule table")?;
    let matcher = ResponseMatcher::new(table);

    eprintln!("🧵 Garment Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Rules: {}", matcher.table().len());
    match config.rules_path {
        Some(ref path) => eprintln!("   Rules file: {}", path.display()),
        None => eprintln!("   Rules file: (built-in FAQ)"),
    }

    let mut channels = ChannelManager::new();

    if config.web_enabled {
        let web = WebChannel::new(matcher.clone());
        let app = web.router();
        let port = config.web_port;
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
            .await
            .with_context(|| format!("Failed to bind web chat port {}", port))?;

        tokio::spawn(async move {
            tracing::info!(port, "Web chat server started");
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Web chat server stopped: {}", e);
            }
        });

        eprintln!("   Chat WS: ws://0.0.0.0:{}/ws/chat", port);
        eprintln!("   Chat API: http://0.0.0.0:{}/api/chat", port);
        channels.add(Box::new(web));
    }

    if config.cli_enabled {
        eprintln!("   Type a question and press Enter. /help for commands, /quit to exit.");
        channels.add(Box::new(CliChannel::new().with_greeting(config.greeting.clone())));
    }

    if channels.names().is_empty() {
        anyhow::bail!(
            "No channels enabled; set GARMENT_ASSIST_CLI_ENABLED or GARMENT_ASSIST_WEB_ENABLED"
        );
    }
    eprintln!("   Channels: {}", channels.names().join(", "));

    SupportDesk::new(config, matcher, channels).run().await?;

    Ok(())
}

/// Stderr logging filtered by `RUST_LOG` (default `info`), plus a daily
/// rolling file when `GARMENT_ASSIST_LOG_DIR` is set.
fn init_tracing(config: &DeskConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    match config.log_dir {
        Some(ref dir) => {
            let appender = tracing_appender::rolling::daily(dir, "garment-assist.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

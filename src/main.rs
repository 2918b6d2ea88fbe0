//! hookbot: вебхуки в потоки WebSocket.
//!
//! `serve` запускает сервер, `make-token` печатает токены доступа.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hookbot::{
    config::{secrets::KEY_ENV, settings::normalize_bind},
    init_logging, serve, AppState, Broker, BrokerConfig, RouterRegistry, Secrets, Settings,
    TokenRequest,
};
use tracing::{error, info};
use url::Url;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

#[derive(Parser)]
#[command(name = "hookbot")]
#[command(version = env!("CARGO_PKG_VERSION"), long_version = LONG_VERSION)]
#[command(about = "Turn webhooks into WebSocket streams", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Запустить сервер
    Serve(ServeArgs),
    /// Напечатать токены доступа для путей
    MakeToken(MakeTokenArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Адрес для HTTP (например `:8080` или `127.0.0.1:8080`)
    #[arg(long, env = "HOOKBOT_BIND")]
    bind: Option<String>,
    /// TOML-файл настроек
    #[arg(long, env = "HOOKBOT_CONFIG")]
    config: Option<PathBuf>,
    /// Включить внешний роутер (можно повторять)
    #[arg(long = "router")]
    routers: Vec<String>,
    /// Ключ токенов доступа
    #[arg(long, env = "HOOKBOT_KEY", hide_env_values = true)]
    key: String,
    /// Секрет подписи GitHub-вебхуков
    #[arg(long, env = "HOOKBOT_GITHUB_SECRET", hide_env_values = true)]
    github_secret: String,
}

#[derive(Args)]
struct MakeTokenArgs {
    /// Печатать только токены
    #[arg(long)]
    bare: bool,
    /// Базовый URL сервера
    #[arg(long, env = "HOOKBOT_URL_BASE", default_value = "http://localhost:8080")]
    url_base: Url,
    /// Ключ токенов доступа
    #[arg(long, env = "HOOKBOT_KEY", hide_env_values = true)]
    key: String,
    /// Пути, например `/sub/builds`
    #[arg(required = true)]
    paths: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Serve(args) => run_serve(args).await,
        Command::MakeToken(args) => run_make_token(args),
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut settings = Settings::load(args.config.as_deref()).context("loading settings")?;
    if let Some(bind) = args.bind {
        settings.bind = normalize_bind(&bind);
    }
    settings.routers.extend(args.routers);

    let logging = init_logging(settings.logging.clone()).context("initializing logging")?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = env!("GIT_COMMIT"),
        built = env!("BUILD_TIME"),
        "Starting hookbot"
    );

    let result = run_server(settings, args.key, args.github_secret).await;
    match &result {
        Ok(()) => info!("Shutdown complete"),
        Err(e) => error!("{e}"),
    }
    logging.shutdown();
    result
}

/// Всё, что идёт после инициализации логирования. Ошибки логируются
/// вызывающим до сброса файлового sink.
async fn run_server(
    settings: Settings,
    key: String,
    github_secret: String,
) -> Result<()> {
    let secrets = Arc::new(Secrets::new(key, github_secret)?);

    let registry = RouterRegistry::new();
    let routers = registry.enable(&settings.routers).inspect_err(|_| {
        info!(available = ?registry.names(), "Known webhook routers");
    })?;

    let broker = Broker::new(BrokerConfig::from(&settings.broker));
    let state = AppState::new(broker, secrets, &settings.broker).with_routers(routers);

    serve(state, &settings.bind_addr(), shutdown_signal()).await?;
    Ok(())
}

fn run_make_token(args: MakeTokenArgs) -> Result<()> {
    anyhow::ensure!(!args.key.is_empty(), "{KEY_ENV} must not be empty");

    let request = TokenRequest {
        paths: args.paths,
        bare: args.bare,
        url_base: args.url_base,
    };
    for line in request.render(args.key.as_bytes())? {
        println!("{line}");
    }
    Ok(())
}

/// Ctrl-C или SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

use anyhow::Context;
use std::sync::Arc;
use tasker::cli::{
    Cli, Commands,
    init::{self, InitConfig, InitResult},
    output::Output,
};
use tasker::db::MemoryStore;
use tasker::utils::toml_config::{LogFormat, TaskerConfig};
use tasker::{AppState, bootstrap_admin, create_app};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Some(Commands::Init {
        path,
        force,
        host,
        port,
    }) = cli.command
    {
        return match init::run(
            InitConfig {
                path,
                force,
                host,
                port,
            },
            &output,
        ) {
            InitResult::Success | InitResult::AlreadyExists => Ok(()),
            InitResult::Error(e) => Err(anyhow::anyhow!(e)),
        };
    }

    let mut config = match TaskerConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            output.error(&format!("Failed to load {}: {}", cli.config.display(), e));
            output.hint("Run 'tasker-server init' to create a configuration");
            return Err(e.into());
        }
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_tracing(&config, cli.verbose);

    let security = config
        .security()
        .context("invalid token signing configuration")?;
    let store = Arc::new(MemoryStore::new());

    if let Some(admin) = config.admin_bootstrap()? {
        bootstrap_admin(store.as_ref(), &admin.email, &admin.password)
            .await
            .context("failed to create the startup administrator")?;
    }

    let state = AppState::new(store, &security);
    let app = create_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    if cli.verbose {
        output.banner();
        output.kv("config", &cli.config.display().to_string());
        output.kv("listening", &addr);
        output.kv(
            "token lifetime",
            &format!("{} minutes", config.auth.token_lifetime_minutes),
        );
        output.newline();
    }
    tracing::info!(%addr, "tasker server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(config: &TaskerConfig, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else {
        config.server.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tasker={0},tower_http={0}", default_level)));

    let registry = tracing_subscriber::registry().with(filter);
    match config.server.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

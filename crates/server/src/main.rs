use anyhow::Context;
use finboard_server::{app, config::Config, logging, open_database, state::AppState};
use finboard_storage::close;
use tokio::{net::TcpListener, signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_json("finboard-server");

    let config = Config::load()?;
    let loader = config.loader()?;
    let pool = open_database(&config.database_path).await?;
    tracing::info!(
        database = %config.database_path.display(),
        sources = ?loader.registry().source_ids(),
        "database ready"
    );

    let bind_addr = config.bind_addr.clone();
    let router = app(AppState::new(pool.clone(), loader, config))?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close(pool).await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("error installing ctrl+c handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!("error installing signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

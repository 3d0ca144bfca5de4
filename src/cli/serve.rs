use std::net::SocketAddr;

use axum::Router;
use clap::Parser;
use tokio::net::TcpListener;

use crate::{
    api::{self, AppState},
    cli::{auth::AuthArgs, db::DbArgs, limiter::LimiterArgs},
    core::Strategy,
    prelude::*,
};

#[derive(Parser)]
pub struct ServeArgs {
    #[clap(long = "bind-address", env = "BIND_ADDRESS", default_value = "127.0.0.1:8080")]
    bind_address: SocketAddr,

    /// Overlap scan strategy.
    #[clap(long = "strategy", env = "OVERLAP_STRATEGY", value_enum, default_value_t)]
    strategy: Strategy,

    /// Send `Strict-Transport-Security`, enable when served over HTTPS.
    #[clap(long = "hsts", env = "HSTS")]
    hsts: bool,

    /// Serve the configured user table at `/api/auth/demo-credentials`.
    #[clap(long = "expose-demo-credentials", env = "EXPOSE_DEMO_CREDENTIALS")]
    expose_demo_credentials: bool,

    #[clap(flatten)]
    db: DbArgs,

    #[clap(flatten)]
    auth: AuthArgs,

    #[clap(flatten)]
    limiter: LimiterArgs,
}

impl ServeArgs {
    pub async fn run(self) -> Result {
        let state = AppState {
            db: self.db.open()?,
            authenticator: self.auth.authenticator()?,
            strategy: self.strategy,
            expose_demo_credentials: self.expose_demo_credentials,
        };
        if self.expose_demo_credentials {
            warn!("demo credentials are exposed, do not use this in production");
        }
        let app: Router = api::router(state, self.limiter.limiters(), self.hsts);

        let listener =
            TcpListener::bind(self.bind_address).await.context("failed to bind to the address")?;
        info!(address = %self.bind_address, "serving…");
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

/// Per <https://github.com/tokio-rs/axum/blob/main/examples/graceful-shutdown/src/main.rs>.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutting down…");
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{error::Error, net::SocketAddr, time::Duration};

use attendance_server::{
    api::router,
    auth::{AccessGateway, LoginFlow},
    config::{AppConfig, TlsPaths},
    state::AppState,
    store::PunchStore,
    telemetry::init_tracing,
};
use axum::Router;
use axum_server::{tls_rustls::RustlsConfig, Handle};

/// How long in-flight requests get to finish after Ctrl-C.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;
    init_tracing(config.server.log_format)?;

    let gateway = AccessGateway::from_settings(&config.auth)?;
    tracing::info!(
        issuer = %config.auth.issuer,
        audience = %config.auth.audience,
        jwks_url = %config.auth.jwks_url,
        "Access tokens verified against identity provider"
    );

    let mut state = AppState::new(PunchStore::new(), gateway);
    if let Some(login) = &config.login {
        state = state.with_login(LoginFlow::new(&config.auth, login)?);
        tracing::info!(frontend = %login.frontend_url, "Login endpoints enabled");
    }
    let app = router(state);

    let addr: SocketAddr = config.server.bind_address().parse()?;
    match &config.server.tls {
        Some(tls) => serve_https(app, addr, tls).await?,
        None => serve_http(app, addr).await?,
    }

    tracing::info!("Attendance server stopped");
    Ok(())
}

async fn serve_http(app: Router, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Attendance server listening on http://{addr} (docs at /docs)");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn serve_https(app: Router, addr: SocketAddr, tls: &TlsPaths) -> Result<(), Box<dyn Error>> {
    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "failed to install rustls crypto provider")?;

    let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
    tracing::info!(
        cert = %tls.cert.display(),
        "Attendance server listening on https://{addr} (docs at /docs)"
    );

    let handle = Handle::<SocketAddr>::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });

    axum_server::bind_rustls(addr, tls_config)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

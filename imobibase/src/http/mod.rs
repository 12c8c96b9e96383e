use crate::state::Zustand;
use color_eyre::eyre;
use http::HeaderName;
use imobibase_config::Configuration;
use std::net::Ipv4Addr;
use tokio::net::TcpListener;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::TraceLayer,
};

#[cfg(target_family = "unix")]
use tokio::signal::unix::SignalKind;

pub use self::router::create as create_router;

mod handler;
mod middleware;
mod router;

static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(target_family = "unix")]
    let second_signal = async {
        let mut terminate = tokio::signal::unix::signal(SignalKind::terminate()).unwrap();
        let mut quit = tokio::signal::unix::signal(SignalKind::quit()).unwrap();

        tokio::select! {
            _ = terminate.recv() => (),
            _ = quit.recv() => (),
        }
    };
    #[cfg(not(target_family = "unix"))]
    let second_signal = std::future::pending();

    tokio::select! {
        _ = ctrl_c => (),
        () = second_signal => (),
    }
}

#[instrument(skip_all, fields(port = %config.server.port))]
pub async fn run(state: Zustand, config: Configuration) -> eyre::Result<()> {
    let router = router::create(state, &config)?;

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.server.port)).await?;
    info!("Listening for incoming connections");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

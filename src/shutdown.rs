use std::future::{Future, IntoFuture};
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch};

use crate::errors::ServiceError;

/// Lifecycle of the HTTP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPhase {
    Running,
    ShutdownRequested,
    Draining,
    Stopped,
}

/// Create the channel on which the server publishes its phase.
pub fn phase_channel() -> (watch::Sender<ShutdownPhase>, watch::Receiver<ShutdownPhase>) {
    watch::channel(ShutdownPhase::Running)
}

/// Serve `app` on `listener` until `signal` resolves, then drain.
///
/// `signal` is awaited on a dedicated task which completes a one-shot
/// handoff once it fires. In-flight requests then get at most `grace`
/// to finish; if they do not, the server is dropped and the timeout is
/// logged. The server ending before a shutdown request is an error.
pub async fn run_until_stopped<S>(
    listener: TcpListener,
    app: Router,
    signal: S,
    grace: Duration,
    phase: watch::Sender<ShutdownPhase>,
) -> Result<(), ServiceError>
where
    S: Future<Output = ()> + Send + 'static,
{
    let (drain_tx, drain_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = drain_rx.await;
            })
            .into_future(),
    );

    let (requested_tx, requested_rx) = oneshot::channel::<()>();
    let watcher = tokio::spawn(async move {
        signal.await;
        let _ = requested_tx.send(());
    });

    phase.send_replace(ShutdownPhase::Running);

    tokio::select! {
        res = &mut server => {
            watcher.abort();
            phase.send_replace(ShutdownPhase::Stopped);
            res??;
            return Err(ServiceError::ServerExited);
        }
        _ = requested_rx => {}
    }

    phase.send_replace(ShutdownPhase::ShutdownRequested);
    tracing::info!("graceful shutdown started, grace period {:?}", grace);

    let _ = drain_tx.send(());
    phase.send_replace(ShutdownPhase::Draining);

    let outcome = match tokio::time::timeout(grace, &mut server).await {
        Ok(Ok(res)) => res.map_err(ServiceError::from),
        Ok(Err(join)) => Err(ServiceError::from(join)),
        Err(_) => {
            tracing::warn!("HTTP server shutdown: timed out after {:?}, dropping open connections", grace);
            server.abort();
            Ok(())
        }
    };

    phase.send_replace(ShutdownPhase::Stopped);
    outcome
}

/// Install the process signal handlers.
///
/// The returned future resolves on the first SIGINT, SIGQUIT or SIGTERM
/// (Ctrl-C off unix).
pub fn os_signal() -> std::io::Result<impl Future<Output = ()> + Send + 'static> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut quit = signal(SignalKind::quit())?;
        let mut terminate = signal(SignalKind::terminate())?;

        Ok(async move {
            let name = tokio::select! {
                _ = interrupt.recv() => "SIGINT",
                _ = quit.recv() => "SIGQUIT",
                _ = terminate.recv() => "SIGTERM",
            };
            tracing::warn!("shutdown signal {:?} received", name);
        })
    }

    #[cfg(not(unix))]
    {
        Ok(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::warn!("shutdown signal \"Ctrl-C\" received");
        })
    }
}

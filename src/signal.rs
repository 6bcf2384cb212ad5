use tokio::{
    select,
    signal::unix::{signal, SignalKind},
    sync::watch,
};
use tracing::{error, info};

pub(crate) fn signal_handler() -> watch::Receiver<()> {
    let (stop_tx, stop_rx) = watch::channel(());
    tokio::spawn(async move {
        let (mut sigterm, mut sigint) = match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
            (Err(error), _) | (_, Err(error)) => {
                error!(%error, "could not install signal handlers");
                std::future::pending::<()>().await;
                return;
            }
        };
        loop {
            select! {
                _ = sigterm.recv() => info!("Received SIGTERM"),
                _ = sigint.recv() => info!("Received SIGINT"),
            };
            if stop_tx.send(()).is_err() {
                break;
            }
        }
    });
    stop_rx
}

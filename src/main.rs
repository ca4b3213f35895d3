use clap::Parser;
use tokio::net::UdpSocket;
use tracing::info;

use ticketd::config::Config;
use ticketd::engine::Engine;
use ticketd::{catalog, server};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = match Config::try_parse() {
        Ok(config) => config,
        // --help and --version are not failures.
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };
    ticketd::observability::init(config.metrics_port)?;

    let events = catalog::load(&config.catalog_path)?;
    let mut engine = Engine::new(events, config.hold_secs);

    let addr = config.listen_addr();
    let socket = UdpSocket::bind(&addr).await?;
    info!("ticketd listening on {}", socket.local_addr()?);
    info!("  catalog: {} ({} events)", config.catalog_path.display(), engine.event_count());
    info!("  hold: {}s", engine.hold_secs());

    let shutdown = async {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to register SIGTERM handler");
            tokio::select! {
                _ = ctrl_c => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            ctrl_c.await.ok();
        }
    };

    server::serve(&socket, &mut engine, shutdown).await?;

    info!(
        "ticketd stopped after {} reservations",
        engine.reservation_count()
    );
    Ok(())
}

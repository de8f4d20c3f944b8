use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, error, info};
use snafu::ResultExt;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::{connection, session, settings};
use crate::{BindSnafu, Error, LocalAddrSnafu};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Stats {
    pub total_accepted_connections: usize,
}

/// Bind and serve one match until it ends or `shutdown_rx` turns `true`.
pub async fn run(
    server: settings::Server,
    game: sixtysix_game::Settings,
    shutdown_rx: watch::Receiver<bool>,
) -> Result<Stats, Error> {
    let listener = bind(&server).await?;
    serve(listener, game, shutdown_rx).await
}

pub async fn bind(server: &settings::Server) -> Result<TcpListener, Error> {
    TcpListener::bind(server.bind_addr.as_str())
        .await
        .context(BindSnafu {
            addr: server.bind_addr.as_str(),
        })
}

/// Accept players on `listener` for one match.
///
/// Connections keep being accepted, and refused once both seats are taken,
/// until the session is torn down or `shutdown_rx` turns `true` (or its
/// sender goes away). Returns once every connection task has finished.
pub async fn serve(
    listener: TcpListener,
    game: sixtysix_game::Settings,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<Stats, Error> {
    let session = session::create(game);
    let local_addr = listener.local_addr().context(LocalAddrSnafu)?;
    info!("sixtysix server running on {}", local_addr);

    let mut total_accepted_connections = 0;
    let mut connection_tasks = FuturesUnordered::new();
    loop {
        tokio::select! {
            _ = raised(&mut shutdown_rx) => {
                info!("received shutdown notice");
                session.shutdown();
                break;
            },
            _ = session.stopped() => {
                info!("session is over");
                break;
            },
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    debug!("accepted connection from {}", addr);
                    total_accepted_connections += 1;
                    connection_tasks.push(connection::spawn(session.clone(), stream, addr));
                }
                Err(e) => error!("accepting connection: {}", e),
            },
            Some(result) = connection_tasks.next() => {
                if let Err(e) = result {
                    error!("connection task: {}", e);
                }
            },
        }
    }
    drop(listener);

    info!("reaping {} connection tasks", connection_tasks.len());
    while let Some(result) = connection_tasks.next().await {
        if let Err(e) = result {
            error!("connection task: {}", e);
        }
    }

    Ok(Stats {
        total_accepted_connections,
    })
}

// Resolves once `rx` holds `true` or its sender is gone.
async fn raised(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|raised| *raised).await;
}

use std::io;
use std::net::SocketAddr;

use futures::{SinkExt, StreamExt};
use log::{debug, error, info};
use snafu::ResultExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};

use sixtysix_game::{Command, Notice};

use crate::session::Shared;
use crate::{CodecSnafu, Error};

/// Longest line accepted from a client.
const MAX_LINE_LENGTH: usize = 256;

type Lines = Framed<TcpStream, LinesCodec>;

pub fn spawn(session: Shared, stream: TcpStream, addr: SocketAddr) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = process_connection(session, stream, addr).await {
            error!("while handling {}; error = {}", addr, e);
        }
    })
}

async fn process_connection(
    session: Shared,
    stream: TcpStream,
    addr: SocketAddr,
) -> Result<(), Error> {
    let mut lines = Framed::new(stream, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));

    if session.is_full().await {
        info!("refusing {}, both seats are taken", addr);
        return send(&mut lines, &Notice::EnoughPlayers, addr).await;
    }

    let handshake = tokio::select! {
        _ = session.stopped() => return Ok(()),
        line = lines.next() => line,
    };
    match handshake {
        Some(Ok(line)) if line.parse::<Command>() == Ok(Command::Connect) => {}
        Some(Ok(line)) => {
            debug!("{} opened with {:?}", addr, line);
            return send(&mut lines, &Notice::WrongInput, addr).await;
        }
        Some(Err(e)) if is_unreadable_line(&e) => {
            debug!("{} opened with an unreadable line: {}", addr, e);
            return send(&mut lines, &Notice::WrongInput, addr).await;
        }
        Some(Err(e)) => return Err(e).context(CodecSnafu { addr }),
        None => {
            debug!("{} hung up before connecting", addr);
            return Ok(());
        }
    }

    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
    let player = match session.join(notice_tx).await {
        Some(player) => player,
        None => {
            info!("refusing {}, both seats are taken", addr);
            return send(&mut lines, &Notice::EnoughPlayers, addr).await;
        }
    };
    info!("{} plays as {}", addr, player);

    // Set after an unreadable line, which the codec follows with one spurious
    // end of stream before it reads on.
    let mut resuming = false;
    let result = loop {
        tokio::select! {
            _ = session.stopped() => {
                debug!("received notification to stop processing {}", addr);
                break Ok(());
            },
            Some(notice) = notice_rx.recv() => {
                if let Err(e) = send(&mut lines, &notice, addr).await {
                    session.leave(player).await;
                    break Err(e);
                }
            },
            line = lines.next() => match line {
                Some(Ok(line)) => {
                    resuming = false;
                    session.dispatch(player, &line).await;
                }
                Some(Err(e)) if is_unreadable_line(&e) => {
                    debug!("unreadable line from {}: {}", addr, e);
                    session.wrong_input(player).await;
                    resuming = true;
                }
                Some(Err(e)) => {
                    session.leave(player).await;
                    break Err(e).context(CodecSnafu { addr });
                }
                None if resuming => resuming = false,
                None => {
                    info!("{} disconnected", addr);
                    session.leave(player).await;
                    break Ok(());
                }
            },
        }
    };
    result?;

    // Whatever the session queued before teardown still goes out.
    notice_rx.close();
    while let Ok(notice) = notice_rx.try_recv() {
        send(&mut lines, &notice, addr).await?;
    }
    debug!("disconnecting from {}", addr);
    Ok(())
}

// Too long or not UTF-8. The codec has already dropped the line.
fn is_unreadable_line(e: &LinesCodecError) -> bool {
    matches!(e, LinesCodecError::MaxLineLengthExceeded)
        || matches!(e, LinesCodecError::Io(e) if e.kind() == io::ErrorKind::InvalidData)
}

async fn send(lines: &mut Lines, notice: &Notice, addr: SocketAddr) -> Result<(), Error> {
    lines
        .send(notice.to_string())
        .await
        .context(CodecSnafu { addr })
}

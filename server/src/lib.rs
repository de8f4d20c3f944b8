#![warn(rust_2018_idioms)]

use std::net::SocketAddr;

use snafu::Snafu;
use tokio_util::codec::LinesCodecError;

pub mod connection;
pub mod server;
pub mod session;
pub mod settings;

pub use server::{bind, run, serve, Stats};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("could not bind to {addr}: {source}"))]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[snafu(display("could not read the listening address: {source}"))]
    LocalAddr { source: std::io::Error },

    #[snafu(display("connection with {addr} failed: {source}"))]
    Codec {
        addr: SocketAddr,
        source: LinesCodecError,
    },
}

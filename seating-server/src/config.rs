//! Server configuration from the command line and environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

/// Default port, matching the planner frontend's expectations.
pub const DEFAULT_PORT: u16 = 5000;

/// Seating planner layout server.
#[derive(Debug, Clone, Parser)]
#[command(name = "seating-server", version, about)]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(long, env = "SEATING_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind to.
    #[arg(long, env = "SEATING_BIND", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub bind: IpAddr,

    /// Directory holding one JSON file per layout.
    #[arg(long, env = "SEATING_DATA_DIR", default_value = "./data/layouts")]
    pub data_dir: PathBuf,
}

impl ServerConfig {
    /// The socket address to listen on.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::ensure;
use clap::Parser;
use connect4::{MatchConfig, StartPolicy};

#[derive(Clone, Debug, Parser)]
#[command(name = "connect4-server", about = "Hosts Connect 4 matches for the web front end")]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "CONNECT4_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: SocketAddr,

    /// Directory holding the built front end.
    #[arg(long, env = "CONNECT4_STATIC_DIR", default_value = "web/dist")]
    pub static_dir: PathBuf,

    /// tracing-subscriber filter directives.
    #[arg(long, env = "CONNECT4_LOG", default_value = "info,tower_http=debug")]
    pub log_filter: String,

    /// Board width used when a request does not name one.
    #[arg(long, env = "CONNECT4_WIDTH", default_value_t = 7)]
    pub width: usize,

    /// Board height used when a request does not name one.
    #[arg(long, env = "CONNECT4_HEIGHT", default_value_t = 6)]
    pub height: usize,

    /// Largest width or height a client may ask for.
    #[arg(long, env = "CONNECT4_MAX_DIMENSION", default_value_t = 32)]
    pub max_dimension: usize,

    /// Matches held in memory at once; finished ones are evicted first.
    #[arg(long, env = "CONNECT4_MAX_MATCHES", default_value_t = 1024)]
    pub max_matches: usize,

    /// Swap the opening player on every restart.
    #[arg(long, env = "CONNECT4_ALTERNATE_START")]
    pub alternate_start: bool,
}

impl ServerConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.max_dimension > 0, "max dimension must be at least 1");
        ensure!(self.max_matches > 0, "max matches must be at least 1");
        for (label, value) in [("width", self.width), ("height", self.height)] {
            ensure!(
                (1..=self.max_dimension).contains(&value),
                "default {label} {value} must be within 1-{}",
                self.max_dimension
            );
        }
        Ok(())
    }

    pub fn match_defaults(&self) -> MatchConfig {
        MatchConfig {
            width: self.width,
            height: self.height,
            start: if self.alternate_start {
                StartPolicy::Alternate
            } else {
                StartPolicy::AlwaysFirst
            },
        }
    }
}

use std::net::{IpAddr, SocketAddr};

use clap::{Parser, ValueEnum};
use itembox_db::DbConfig;

/// Deployment mode. Development exposes backend error details in responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Development,
    #[default]
    Production,
}

impl Mode {
    pub fn exposes_details(self) -> bool {
        self == Mode::Development
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "itembox-server", about = "Item CRUD HTTP API")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "ITEMBOX_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Deployment mode
    #[arg(long, env = "ITEMBOX_MODE", value_enum, default_value = "production")]
    pub mode: Mode,

    /// Front-end origins allowed to call the API (comma separated)
    #[arg(
        long,
        env = "ITEMBOX_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// Table holding the items
    #[arg(long, env = "ITEMBOX_TABLE", default_value = itembox_db::DEFAULT_TABLE)]
    pub table: String,

    /// SQLite database file
    #[arg(long, env = "ITEMBOX_DB_PATH")]
    pub db_path: Option<String>,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            sqlite_path: self.db_path.clone(),
            table: self.table.clone(),
        }
    }
}

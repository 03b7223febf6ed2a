use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "JOKESTER_GATEWAY_LISTEN_ADDR";
pub const STORAGE_BACKEND_ENV: &str = "JOKESTER_GATEWAY_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "JOKESTER_GATEWAY_MYSQL_DSN";
pub const LIST_LIMIT_ENV: &str = "JOKESTER_GATEWAY_LIST_LIMIT";
pub const SEED_DEMO_ENV: &str = "JOKESTER_GATEWAY_SEED_DEMO";
pub const LOG_FORMAT_ENV: &str = "JOKESTER_GATEWAY_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_LIST_LIMIT: &str = "5";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "jokester-gateway",
    about = "HTTP gateway for sharing jokes",
    long_about = "HTTP gateway for sharing jokes.\n\n\
        Callers are identified by the x-jokester-user request header, which is \
        trusted as sent: any client can claim any registered user. Run it for \
        demos, or behind a proxy that sets the header."
)]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    /// How many jokes the listing shows.
    #[arg(
        long,
        env = LIST_LIMIT_ENV,
        default_value = DEFAULT_LIST_LIMIT,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub list_limit: u16,

    /// Seed demo users and jokes on startup.
    #[arg(long, env = SEED_DEMO_ENV)]
    pub seed_demo: bool,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}

//! Runtime configuration.
//!
//! Flags with environment fallbacks; the defaults mirror a local
//! development setup. The access key default is a placeholder and must be
//! overridden in any real deployment.

use clap::Parser;

/// Command-line and environment configuration for the server.
#[derive(Parser, Debug, Clone)]
#[command(name = "msgboard", version, about = "Minimal HTTP message board")]
pub struct Config {
    /// Port the listener binds on.
    #[arg(long, env = "MSGBOARD_PORT", default_value_t = 8081)]
    pub port: u16,

    /// Access key required to post a message.
    #[arg(
        long,
        env = "MSGBOARD_ACCESS_KEY",
        default_value = "c29NZVN1cGVSYW5kb21BbmRTM2NSM3RLM3k="
    )]
    pub access_key: String,

    /// Connection string of the MySQL database.
    #[arg(long, env = "MSGBOARD_MYSQL_DSN", default_value = "")]
    pub mysql_dsn: String,

    /// Deadline applied to every request, in seconds.
    #[arg(long, env = "MSGBOARD_REQUEST_TIMEOUT_SECS", default_value_t = 5)]
    pub request_timeout_secs: u64,

    /// How long in-flight requests may drain during shutdown, in seconds.
    #[arg(long, env = "MSGBOARD_SHUTDOWN_GRACE_SECS", default_value_t = 30)]
    pub shutdown_grace_secs: u64,
}

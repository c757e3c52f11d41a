pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7869;
/// Blob strings bigger than this are rejected, 512 MiB.
pub const DEFAULT_MAX_MULTI_BULK_LENGTH: usize = 512 * 1024 * 1024;

/// Server settings, fixed for the lifetime of the process.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Maximum number of simultaneous clients, `0` for no limit.
    pub max_clients: usize,
    /// Seconds a client may stay idle before it is disconnected, `0` to never time out.
    pub max_timeout: u64,
    pub max_multi_bulk_length: usize,
    /// Whether a tracing subscriber is installed at all.
    pub logging: bool,
    pub verbose: bool,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_clients: 0,
            max_timeout: 0,
            max_multi_bulk_length: DEFAULT_MAX_MULTI_BULK_LENGTH,
            logging: true,
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn log_level(&self) -> tracing::Level {
        if self.debug {
            tracing::Level::DEBUG
        } else if self.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

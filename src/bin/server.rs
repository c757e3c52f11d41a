use cachet::config::{Config, DEFAULT_HOST, DEFAULT_MAX_MULTI_BULK_LENGTH, DEFAULT_PORT};
use cachet::{server, Error};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The address to listen on
    #[arg(long, env = "CACHET_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// The port to listen on
    #[arg(short, long, env = "CACHET_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Maximum number of simultaneous clients, 0 for no limit
    #[arg(long, env = "CACHET_MAX_CLIENTS", default_value_t = 0)]
    max_clients: usize,

    /// Seconds a client may stay idle before it is disconnected, 0 to never time out
    #[arg(long, env = "CACHET_MAX_TIMEOUT", default_value_t = 0)]
    max_timeout: u64,

    /// Maximum length in bytes of a single blob string
    #[arg(long, env = "CACHET_MAX_MULTI_BULK_LENGTH", default_value_t = DEFAULT_MAX_MULTI_BULK_LENGTH)]
    max_multi_bulk_length: usize,

    /// Disable logging entirely
    #[arg(long, env = "CACHET_NO_LOGGING")]
    no_logging: bool,

    /// Log connections and lifecycle events
    #[arg(short, long, env = "CACHET_VERBOSE")]
    verbose: bool,

    /// Log every request and reply
    #[arg(short, long, env = "CACHET_DEBUG")]
    debug: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            host: args.host,
            port: args.port,
            max_clients: args.max_clients,
            max_timeout: args.max_timeout,
            max_multi_bulk_length: args.max_multi_bulk_length,
            logging: !args.no_logging,
            verbose: args.verbose,
            debug: args.debug,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    server::run(args.into()).await
}

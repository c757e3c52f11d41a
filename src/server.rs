use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{self, Duration};
use tracing::{debug, error, info, instrument, warn};

use crate::codec::FrameCodec;
use crate::config::Config;
use crate::connection::Connection;
use crate::frame::{self, Frame};
use crate::registry::Registry;
use crate::session::Session;
use crate::store::Store;
use crate::Error;

/// Installs the log subscriber, binds the configured address and serves clients until the
/// listener fails.
pub async fn run(config: Config) -> Result<(), Error> {
    if config.logging {
        let _ = tracing_subscriber::fmt()
            .with_max_level(config.log_level())
            .try_init()
            .map_err(|e| debug!("Failed to initialize global tracing: {}", e));
    }

    let listener = TcpListener::bind(config.address()).await?;

    serve(listener, config).await
}

/// Accepts clients on an already bound listener, one task per connection, all sharing one store.
pub async fn serve(listener: TcpListener, config: Config) -> Result<(), Error> {
    let store = Store::new();
    let registry = Registry::new();
    let config = Arc::new(config);

    info!("Server listening on {}", listener.local_addr()?);

    loop {
        let (socket, client_address) = listener.accept().await?;
        let store = store.clone();
        let registry = registry.clone();
        let config = config.clone();
        debug!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) =
                handle_connection(socket, client_address, store, registry, config).await
            {
                error!("Connection failed: {}", e);
            }
        });
    }
}

#[instrument(
    name = "connection",
    skip(stream, store, registry, config),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    store: Store,
    registry: Registry,
    config: Arc<Config>,
) -> Result<(), frame::Error> {
    let codec = FrameCodec::new(config.max_multi_bulk_length);
    let mut conn = Connection::with_codec(stream, codec);

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    let Some(_registration) = registry.register(conn.id, client_address, config.max_clients)
    else {
        warn!("Max number of clients reached, rejecting connection");
        let reply = Frame::Error("ERR max number of clients reached".to_string());
        return conn.write_frame(&reply).await;
    };

    let idle_timeout = (config.max_timeout > 0).then(|| Duration::from_secs(config.max_timeout));
    let mut session = Session::new();

    loop {
        let read = match idle_timeout {
            Some(idle_timeout) => match time::timeout(idle_timeout, conn.read_frame()).await {
                Ok(read) => read,
                Err(_) => {
                    info!("Client idle for too long, closing connection");
                    break;
                }
            },
            None => conn.read_frame().await,
        };

        let reply = match read {
            Ok(Some(frame)) => {
                debug!("Received frame from client: {:?}", frame);
                session.handle(frame, &store)
            }
            Ok(None) => {
                debug!("Connection closed by client");
                break;
            }
            Err(err) if err.is_recoverable() => {
                debug!("Protocol error: {}", err);
                Frame::Error(format!("ERR Protocol error: {}", err))
            }
            Err(err) => return Err(err),
        };

        debug!("Sending reply to client: {:?}", reply);
        conn.write_frame(&reply).await?;
    }

    Ok(())
}

use std::io::{BufReader, ErrorKind};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use log::{debug, error, info, warn};
use stocks_common::StocksError;
use stocks_common::protocol::{read_message, write_message};
use stocks_common::{Request, Response};

use crate::handler::RequestHandler;

/// TCP receiver that accepts dashboard connections.
///
/// Each accepted connection is served on its own thread. A connection carries any number
/// of JSON-line requests; a request that fails to decode is answered with
/// `Response::Error` and the connection stays open. Faults on one connection never stop
/// the accept loop.
pub struct RequestReceiver {
    /// The underlying TCP listening socket.
    pub(crate) socket: TcpListener,
}

impl RequestReceiver {
    /// Bind a new TCP receiver to the provided `bind_addr` (e.g., `0.0.0.0:8080`).
    pub fn new(bind_addr: &str) -> Result<Self, StocksError> {
        let socket = TcpListener::bind(bind_addr)?;
        Ok(Self { socket })
    }

    /// Address the receiver is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, StocksError> {
        Ok(self.socket.local_addr()?)
    }

    /// Blocking accept loop.
    pub fn serve(self, handler: Arc<RequestHandler>) -> Result<(), StocksError> {
        info!("Stocks server is started on {}", self.socket.local_addr()?);

        for stream in self.socket.incoming() {
            match stream {
                Ok(stream) => {
                    let handler = Arc::clone(&handler);
                    thread::spawn(move || {
                        let peer = stream.peer_addr().ok();
                        if let Err(e) = handle_connection(stream, &handler) {
                            error!("Connection {:?} failed: {}", peer, e);
                        }
                    });
                }
                Err(e) => error!("TCP connection error: {}", e),
            }
        }
        Ok(())
    }
}

/// Serves requests on one connection until the peer hangs up.
pub(crate) fn handle_connection(
    stream: TcpStream,
    handler: &RequestHandler,
) -> Result<(), StocksError> {
    let peer = stream.peer_addr()?;
    debug!("Client connected: {}", peer);
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    loop {
        let response = match read_message::<_, Request>(&mut reader) {
            Ok(Some(request)) => {
                debug!("Request from {}: {:?}", peer, request);
                handler.handle(request)
            }
            Ok(None) => break,
            Err(StocksError::SerdeJson(e)) => {
                warn!("Malformed request from {}: {}", peer, e);
                Response::Error(format!("malformed request: {}", e))
            }
            Err(StocksError::Io(e)) if e.kind() == ErrorKind::ConnectionReset => break,
            Err(e) => return Err(e),
        };
        write_message(&mut writer, &response)?;
    }

    debug!("Client disconnected: {}", peer);
    Ok(())
}

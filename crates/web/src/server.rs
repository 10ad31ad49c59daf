//! A tokio TCP transport for the dispatcher.
//!
//! Each accepted connection carries exactly one request. The request is read
//! and buffered in full by [`RequestDecoder`], dispatched, and the connection
//! is closed once the response has been written.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

use bytes::Bytes;
use dispatch_http::codec::{RequestDecoder, RequestLimits};
use dispatch_http::connection::{MessageWriter, ReplySink};
use dispatch_http::protocol::{ParseError, ResponseHead};
use futures::StreamExt;
use http::StatusCode;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio_util::codec::FramedRead;
use tracing::{debug, error, info, warn};

use crate::Dispatcher;
use crate::router::Router;

const READ_BUFFER_CAPACITY: usize = 8 * 1024;

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("router must be set")]
    MissingRouter,

    #[error("address must be set")]
    MissingAddress,

    #[error("invalid address: {source}")]
    InvalidAddress {
        #[from]
        source: io::Error,
    },
}

#[derive(Debug, Default)]
pub struct ServerBuilder {
    router: Option<Router>,
    address: Option<io::Result<Vec<SocketAddr>>>,
    limits: RequestLimits,
}

impl ServerBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Sets the listen address; resolution errors are reported by [`ServerBuilder::build`]
    #[must_use]
    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    #[must_use]
    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    #[must_use]
    pub fn limits(mut self, limits: RequestLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn max_header_bytes(mut self, bytes: usize) -> Self {
        self.limits = self.limits.max_header_bytes(bytes);
        self
    }

    #[must_use]
    pub fn max_headers(mut self, count: usize) -> Self {
        self.limits = self.limits.max_headers(count);
        self
    }

    #[must_use]
    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.limits = self.limits.max_body_bytes(bytes);
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let router = self.router.ok_or(ServerBuildError::MissingRouter)?;
        let address = self.address.ok_or(ServerBuildError::MissingAddress)??;
        if address.is_empty() {
            return Err(ServerBuildError::MissingAddress);
        }
        Ok(Server { dispatcher: Dispatcher::new(router), address, limits: self.limits })
    }
}

#[derive(Debug)]
pub struct Server {
    dispatcher: Dispatcher,
    address: Vec<SocketAddr>,
    limits: RequestLimits,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn address(&self) -> &[SocketAddr] {
        &self.address
    }

    /// Binds the configured address and serves until the task is dropped
    pub async fn start(self) -> io::Result<()> {
        info!(address = ?self.address, "start listening");
        let listener = TcpListener::bind(self.address.as_slice()).await.inspect_err(|e| {
            error!(cause = %e, "bind server error");
        })?;
        self.serve(listener).await
    }

    /// Serves connections accepted from an already bound `listener`
    pub async fn serve(self, listener: TcpListener) -> io::Result<()> {
        loop {
            let (tcp_stream, remote_addr) = match listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let dispatcher = self.dispatcher.clone();
            let limits = self.limits;
            tokio::spawn(async move {
                handle_connection(&dispatcher, limits, tcp_stream, remote_addr).await;
            });
        }
    }
}

async fn handle_connection(dispatcher: &Dispatcher, limits: RequestLimits, stream: TcpStream, remote_addr: SocketAddr) {
    let (reader, mut writer) = stream.into_split();
    let (sender, mut receiver) = unbounded_channel::<Bytes>();

    let write_task = tokio::spawn(async move {
        while let Some(bytes) = receiver.recv().await {
            writer.write_all(&bytes).await?;
        }
        writer.shutdown().await
    });

    let mut framed_read = FramedRead::with_capacity(reader, RequestDecoder::with_limits(limits), READ_BUFFER_CAPACITY);
    match framed_read.next().await {
        Some(Ok(raw)) => {
            debug!(%remote_addr, method = %raw.method(), uri = raw.uri(), "request received");
            match dispatcher.serve(raw, Box::new(MessageWriter::new(sender.clone()))) {
                Ok(()) => drop(sender),
                Err(e) => {
                    warn!(%remote_addr, cause = %e, "can't initialize connection");
                    reply_error(sender, StatusCode::BAD_REQUEST);
                }
            }
        }
        Some(Err(e)) => {
            warn!(%remote_addr, cause = %e, "can't decode request");
            reply_error(sender, status_for(&e));
        }
        None => {
            debug!(%remote_addr, "connection closed before a request arrived");
            drop(sender);
        }
    }

    // every sender is gone here, so the writer drains the channel and shuts the socket down
    match write_task.await {
        Ok(Ok(())) => debug!(%remote_addr, "connection shutdown"),
        Ok(Err(e)) => warn!(%remote_addr, cause = %e, "failed to write response"),
        Err(e) => error!(%remote_addr, cause = %e, "writer task failed"),
    }
}

fn status_for(e: &ParseError) -> StatusCode {
    match e {
        ParseError::UnsupportedTransferEncoding => StatusCode::LENGTH_REQUIRED,
        ParseError::TooLargeBody { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        ParseError::TooLargeHeader { .. } | ParseError::TooManyHeaders { .. } => {
            StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE
        }
        _ => StatusCode::BAD_REQUEST,
    }
}

fn reply_error(sender: UnboundedSender<Bytes>, status: StatusCode) {
    let body = Bytes::from_static(status.canonical_reason().unwrap_or_default().as_bytes());
    if let Err(e) = MessageWriter::new(sender).send_reply(ResponseHead::from_status(status), body) {
        warn!(%status, cause = %e, "failed to send error response");
    }
}

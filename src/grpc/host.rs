//! Service host: handshake and serve lifecycle.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;

use crate::context::Context;
use crate::grpc::controller::Controller;
use crate::grpc::definition_service::DefinitionServer;
use crate::grpc::handshake::{self, HandshakeLine};
use crate::proto::plugin::grpc_controller_server::GrpcControllerServer;
use crate::proto::servicepb::definition_service_server::DefinitionServiceServer;
use crate::service::{Service, TypedName};
use crate::types::{Config, Error, Result, ServerConfig};

/// Serves one wrapped service until shut down.
pub struct ServiceHost<S> {
    root: Arc<Context>,
    service: Arc<S>,
    shutdown: CancellationToken,
}

impl<S: Service> ServiceHost<S> {
    pub fn new(root: Context, service: S) -> Self {
        Self {
            root: Arc::new(root),
            service: Arc::new(service),
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that stops the server when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Ask the wrapped service for its identifier on a fresh fork.
    pub async fn identify(&self) -> Result<TypedName> {
        let mut ctx = self.root.fork();
        self.service.identifier(&mut ctx).await
    }

    /// Serve on `listener` until shut down.
    pub async fn run(self, listener: TcpListener) -> Result<()> {
        self.run_with(listener, |_| Ok(())).await
    }

    /// Serve on `listener`, calling `ready` with the bound address right before
    /// the first request can be accepted.
    pub async fn run_with<F>(self, listener: TcpListener, ready: F) -> Result<()>
    where
        F: FnOnce(SocketAddr) -> Result<()>,
    {
        let addr = listener.local_addr()?;
        let id = self.identify().await?;
        tracing::info!(service = %id, %addr, "starting to serve");

        ready(addr)?;

        let shutdown = self.shutdown.clone();
        let definitions = DefinitionServer::with_shared_root(self.root, self.service);
        Server::builder()
            .add_service(DefinitionServiceServer::new(definitions))
            .add_service(GrpcControllerServer::new(Controller::new(self.shutdown)))
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                shutdown.cancelled().await
            })
            .await?;

        tracing::info!(service = %id, "done serving");
        Ok(())
    }
}

impl<S> std::fmt::Debug for ServiceHost<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceHost")
            .field("root", &self.root)
            .field("shutdown", &self.shutdown)
            .finish_non_exhaustive()
    }
}

/// Serve `service` as a plugin of the process that launched us.
///
/// Verifies the magic cookie, negotiates the protocol version, binds within
/// the configured port range, prints the handshake line on stdout and blocks
/// until the host calls `Shutdown` or the process receives ctrl-c.
pub async fn serve<S: Service>(root: Context, service: S, config: &Config) -> Result<()> {
    let env: HashMap<String, String> = std::env::vars().collect();
    serve_with_env(root, service, config, &env).await
}

/// [`serve`] with the host-provided environment passed explicitly.
///
/// Handshake failures are returned before any port is bound.
pub async fn serve_with_env<S: Service>(
    root: Context,
    service: S,
    config: &Config,
    env: &HashMap<String, String>,
) -> Result<()> {
    handshake::verify_magic_cookie(&config.handshake, env)?;
    let app_version = handshake::negotiate_version(&config.handshake, env)?;

    let listener = bind(&config.server).await?;
    let host = ServiceHost::new(root, service);

    let on_ctrl_c = host.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            on_ctrl_c.cancel();
        }
    });

    let core_version = config.handshake.core_protocol_version;
    host.run_with(listener, |addr| {
        let line = HandshakeLine::new(core_version, app_version, addr);
        handshake::announce(&mut std::io::stdout().lock(), &line)
    })
    .await
}

/// Bind the first free port in the configured range.
pub async fn bind(server: &ServerConfig) -> Result<TcpListener> {
    for port in server.min_port..=server.max_port {
        match TcpListener::bind((server.bind_host.as_str(), port)).await {
            Ok(listener) => return Ok(listener),
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::AddrInUse | std::io::ErrorKind::PermissionDenied
                ) =>
            {
                tracing::trace!(port, "port unavailable: {}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(Error::config(format!(
        "no free port on {} in {}..={}",
        server.bind_host, server.min_port, server.max_port
    )))
}

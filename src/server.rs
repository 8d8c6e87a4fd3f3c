//! HTTP server and graceful shutdown.
//!
//! The server is the outer edge of a [`Pipe`]: it turns bytes on a socket
//! into [`Request`]s, dispatches them, and writes the [`Response`]s back.
//!
//! On SIGTERM or Ctrl-C it stops accepting, lets every in-flight connection
//! finish, then returns from [`Server::serve`].

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::method::Method;
use crate::pipe::Pipe;
use crate::request::Request;
use crate::response::Response;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { addr: config.addr }
    }

    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust
    /// use conduit::Server;
    /// let server = Server::bind("0.0.0.0:3000").unwrap();
    /// ```
    pub fn bind(addr: &str) -> Result<Self> {
        let addr = addr.parse().map_err(|_| Error::InvalidAddr(addr.to_owned()))?;
        Ok(Self { addr })
    }

    /// Starts accepting connections and dispatching them through `app`.
    ///
    /// Returns only after a full graceful shutdown.
    pub async fn serve(self, app: Pipe) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        Self::serve_with_shutdown(listener, app, shutdown_signal()).await
    }

    /// Serves `app` on an already-bound listener until `signal` resolves,
    /// then drains in-flight connections.
    pub async fn serve_with_shutdown(
        listener: TcpListener,
        app: Pipe,
        signal: impl Future<Output = ()>,
    ) -> Result<()> {
        let app = Arc::new(app);
        info!(addr = %listener.local_addr()?, "conduit listening");

        let mut tasks = tokio::task::JoinSet::new();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting immediately,
                // even with connections queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let app = Arc::clone(&app);
                            async move { dispatch(&app, req, remote_addr).await }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("conduit stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request and produces one response.
///
/// Methods outside [`Method`] are answered `405` here. An `Err` from the
/// pipe means a broken composition; it is logged and handed to hyper, which
/// aborts the request instead of inventing a response.
async fn dispatch(
    app: &Pipe,
    req: hyper::Request<Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>> {
    let method = match Method::try_from(req.method()) {
        Ok(m) => m,
        Err(e) => {
            debug!(peer = %remote_addr, "{e}");
            return Ok(Response::status(http::StatusCode::METHOD_NOT_ALLOWED).into_inner());
        }
    };

    let req = Request::from_hyper(method, req).await?;
    match app.dispatch(req).await {
        Ok(res) => Ok(res.into_inner()),
        Err(e) => {
            error!(peer = %remote_addr, error = %e, "pipeline failed");
            Err(e)
        }
    }
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C) the process receives.
/// On Windows only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

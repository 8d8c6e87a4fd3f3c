//! # conduit
//!
//! A middleware pipeline and path router for HTTP services.
//! Sequence middlewares. Match paths to handlers. Nothing more.
//!
//! ## The pieces
//!
//! - [`Pipe`]: an ordered chain of [`Middleware`]s. Each one answers the
//!   request itself or passes it on through [`Next`](middleware::Next).
//! - [`Router`]: matches method + path pattern (`/articles/{id:[0-9]+}`)
//!   and calls the handler with the placeholders as request attributes.
//!   Unknown method → 405, unknown path → 404.
//! - [`PrefixRouter`]: hands whole URL zones (`/api/`, `/dashboard/`, `/`)
//!   to their own router or pipe.
//! - [`Server`]: hyper + tokio, graceful shutdown. Reads requests off the
//!   socket, dispatches them through a pipe, writes the responses back.
//!
//! Pipes, routers and prefix routers are all middlewares, so they nest
//! freely. They are immutable once built and hold no per-request state:
//! share one instance across every connection.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use conduit::{Pipe, PrefixRouter, Request, Response, Router, Server, middleware::Trace};
//!
//! #[tokio::main]
//! async fn main() -> conduit::Result<()> {
//!     let app = Pipe::new()
//!         .with(Trace)
//!         .with(PrefixRouter::new()
//!             .mount("/api/", Router::new()
//!                 .get("/api/articles",                list_articles)
//!                 .get("/api/articles/{id:[0-9]+}",    get_article))
//!             .mount("/", Router::new()
//!                 .get("/", home)));
//!
//!     app.run(Server::bind("0.0.0.0:3000")?).await
//! }
//!
//! async fn list_articles(_req: Request) -> Response {
//!     Response::json(r#"[{"id":"1"}]"#)
//! }
//!
//! async fn get_article(req: Request) -> Response {
//!     let id = req.attribute("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//!
//! async fn home(_req: Request) -> &'static str {
//!     "welcome"
//! }
//! ```

mod config;
mod error;
mod handler;
mod method;
mod pattern;
mod pipe;
mod prefix;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

pub use config::{ADDR_VAR, Config};
pub use error::{Error, Result};
pub use handler::Handler;
pub use http::StatusCode;
pub use method::Method;
pub use middleware::Middleware;
pub use pattern::PathPattern;
pub use pipe::Pipe;
pub use prefix::PrefixRouter;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;

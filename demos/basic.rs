//! Minimal conduit application: an authenticated `/api/` zone and a public site.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/
//!   curl -i http://localhost:3000/api/articles                       # 401
//!   curl -i -H 'authorization: Bearer x' http://localhost:3000/api/articles/42
//!   curl -i -H 'authorization: Bearer x' http://localhost:3000/api/articles/abc  # 404
//!   curl -i -X DELETE http://localhost:3000/                         # 405

use conduit::middleware::{BoxFuture, Next, Trace};
use conduit::{Config, Middleware, Pipe, PrefixRouter, Request, Response, Router, Server, StatusCode};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> conduit::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let api = Pipe::new()
        .with(Authentication)
        .with(Router::new()
            .get("/api/articles",              list_articles)
            .post("/api/articles",             create_article)
            .get("/api/articles/{id:[0-9]+}",  get_article));

    let site = Router::new()
        .get("/",                  home)
        .get("/article/{id}",      article_page);

    let app = Pipe::new()
        .with(Trace)
        .with(PrefixRouter::new()
            .mount("/api/", api)
            .mount("/",     site));

    app.run(Server::new(Config::from_env()?)).await
}

/// Rejects requests without an `authorization` header.
struct Authentication;

impl Middleware for Authentication {
    fn process<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a> {
        if req.header("authorization").is_none() {
            return Box::pin(async { Ok(Response::status(StatusCode::UNAUTHORIZED)) });
        }
        next.handle(req)
    }
}

// GET /api/articles
async fn list_articles(_req: Request) -> Response {
    Response::json(r#"[{"id":"1","title":"hello"}]"#)
}

// POST /api/articles → 201 Created
async fn create_article(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }

    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/api/articles/2")
        .json(r#"{"id":"2"}"#)
}

// GET /api/articles/{id}
async fn get_article(req: Request) -> Response {
    let id = req.attribute("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","title":"hello"}}"#))
}

async fn home(_req: Request) -> &'static str {
    "welcome"
}

async fn article_page(req: Request) -> String {
    format!("article {}", req.attribute("id").unwrap_or("?"))
}

use std::net::SocketAddr;

use conduit::middleware::{BoxFuture, Next, Trace};
use conduit::{Middleware, Pipe, Request, Response, Router, Server};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

async fn show(req: Request) -> Response {
    Response::text(format!("article {}", req.attribute("id").unwrap_or("?")))
}

async fn echo(req: Request) -> Response {
    Response::text(String::from_utf8_lossy(req.body()).into_owned())
}

struct Forward;

impl Middleware for Forward {
    fn process<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a> {
        next.handle(req)
    }
}

async fn start(app: Pipe) -> (SocketAddr, oneshot::Sender<()>, tokio::task::JoinHandle<conduit::Result<()>>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(Server::serve_with_shutdown(listener, app, async move {
        let _ = rx.await;
    }));
    (addr, tx, handle)
}

/// Sends one HTTP/1.1 request and returns the raw response text, or `None`
/// if the server dropped the connection without answering.
async fn send(addr: SocketAddr, raw: &str) -> Option<String> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.ok()?;
    (!buf.is_empty()).then(|| String::from_utf8_lossy(&buf).into_owned())
}

fn app() -> Pipe {
    Pipe::new().with(Trace).with(
        Router::new()
            .get("/articles/{id:[0-9]+}", show)
            .post("/echo", echo),
    )
}

#[tokio::test]
async fn serves_routes_and_misses() {
    let (addr, shutdown, handle) = start(app()).await;

    let res = send(addr, "GET /articles/42 HTTP/1.1\r\nhost: test\r\nconnection: close\r\n\r\n")
        .await
        .unwrap();
    assert!(res.starts_with("HTTP/1.1 200 OK"), "{res}");
    assert!(res.ends_with("article 42"), "{res}");

    let res = send(addr, "GET /articles/abc HTTP/1.1\r\nhost: test\r\nconnection: close\r\n\r\n")
        .await
        .unwrap();
    assert!(res.starts_with("HTTP/1.1 404"), "{res}");

    let res = send(addr, "PUT /echo HTTP/1.1\r\nhost: test\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
        .await
        .unwrap();
    assert!(res.starts_with("HTTP/1.1 405"), "{res}");

    shutdown.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn forwards_the_request_body() {
    let (addr, shutdown, handle) = start(app()).await;

    let res = send(
        addr,
        "POST /echo HTTP/1.1\r\nhost: test\r\ncontent-length: 5\r\nconnection: close\r\n\r\nhello",
    )
    .await
    .unwrap();
    assert!(res.starts_with("HTTP/1.1 200 OK"), "{res}");
    assert!(res.ends_with("hello"), "{res}");

    shutdown.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn unsupported_methods_are_405() {
    let (addr, shutdown, handle) = start(app()).await;

    let res = send(addr, "PATCH /echo HTTP/1.1\r\nhost: test\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
        .await
        .unwrap();
    assert!(res.starts_with("HTTP/1.1 405"), "{res}");

    shutdown.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn exhausted_chain_aborts_instead_of_answering() {
    let (addr, shutdown, handle) = start(Pipe::new().with(Forward)).await;

    let res = send(addr, "GET / HTTP/1.1\r\nhost: test\r\nconnection: close\r\n\r\n").await;
    assert!(res.is_none(), "expected no response, got {res:?}");

    shutdown.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, Response, StatusCode, Uri};
use http_body::Frame;
use http_body_util::BodyExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use trace_relay::forward::{OutboundTransport, TransportError};

/// What a [`RecordingTransport`] saw.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

enum Reply {
    Respond {
        status: StatusCode,
        headers: Vec<(&'static str, &'static str)>,
        body: Bytes,
    },
    Broken {
        status: StatusCode,
        headers: Vec<(&'static str, &'static str)>,
        first_chunk: Bytes,
    },
    Fail,
}

/// Upstream body that yields one chunk and then fails.
struct BrokenBody {
    first_chunk: Option<Bytes>,
}

impl http_body::Body for BrokenBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, axum::Error>>> {
        match self.first_chunk.take() {
            Some(chunk) => Poll::Ready(Some(Ok(Frame::data(chunk)))),
            None => Poll::Ready(Some(Err(axum::Error::new("upstream connection reset")))),
        }
    }
}

fn build_response(
    status: StatusCode,
    headers: &[(&'static str, &'static str)],
    body: Body,
) -> Response<Body> {
    let mut builder = Response::builder().status(status);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(body).unwrap()
}

/// Transport substitute that records every request and replays a canned reply.
pub struct RecordingTransport {
    captured: Mutex<Vec<Captured>>,
    reply: Reply,
}

impl RecordingTransport {
    pub fn responding(
        status: StatusCode,
        headers: Vec<(&'static str, &'static str)>,
        body: impl Into<Bytes>,
    ) -> Arc<Self> {
        Arc::new(Self {
            captured: Mutex::new(Vec::new()),
            reply: Reply::Respond {
                status,
                headers,
                body: body.into(),
            },
        })
    }

    pub fn ok() -> Arc<Self> {
        Self::responding(StatusCode::OK, Vec::new(), "response body")
    }

    /// Replies with `status` and `headers`, then breaks the body after `first_chunk`.
    pub fn breaking(
        status: StatusCode,
        headers: Vec<(&'static str, &'static str)>,
        first_chunk: &'static str,
    ) -> Arc<Self> {
        Arc::new(Self {
            captured: Mutex::new(Vec::new()),
            reply: Reply::Broken {
                status,
                headers,
                first_chunk: Bytes::from_static(first_chunk.as_bytes()),
            },
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            captured: Mutex::new(Vec::new()),
            reply: Reply::Fail,
        })
    }

    pub fn captured(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }

    pub fn last(&self) -> Captured {
        self.captured().pop().expect("no request reached the transport")
    }
}

#[async_trait]
impl OutboundTransport for RecordingTransport {
    async fn send(&self, request: Request<Bytes>) -> Result<Response<Body>, TransportError> {
        let (parts, body) = request.into_parts();
        self.captured.lock().unwrap().push(Captured {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        });

        match &self.reply {
            Reply::Respond {
                status,
                headers,
                body,
            } => Ok(build_response(*status, headers, Body::from(body.clone()))),
            Reply::Broken {
                status,
                headers,
                first_chunk,
            } => Ok(build_response(
                *status,
                headers,
                Body::new(BrokenBody {
                    first_chunk: Some(first_chunk.clone()),
                }),
            )),
            Reply::Fail => Err(TransportError::Unreachable("connection refused".into())),
        }
    }
}

/// Collect a response body.
pub async fn body_bytes(response: axum::response::Response) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// Start a raw upstream that records each request and answers with `response`.
///
/// Returns the bound address and a channel of raw request texts.
pub async fn start_upstream(response: &'static str) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let raw = read_request(&mut socket).await;
                        let _ = tx.send(raw);
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

/// Start an upstream that accepts connections and never answers.
pub async fn start_silent_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return String::from_utf8_lossy(&buf).into_owned();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    String::from_utf8_lossy(&buf).into_owned()
}

//! Response sink that buffers the whole response in memory

use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::io::AsyncWrite;

use super::ResponseSink;

#[derive(Debug, Default)]
struct BodyBuffer {
    bytes: Vec<u8>,
    outputs_closed: usize,
}

fn lock(body: &Mutex<BodyBuffer>) -> MutexGuard<'_, BodyBuffer> {
    body.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Collects status, headers and body, then converts into an axum response
#[derive(Debug)]
pub struct BufferedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Arc<Mutex<BodyBuffer>>,
}

impl Default for BufferedResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Arc::new(Mutex::new(BodyBuffer::default())),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Vec<u8> {
        lock(&self.body).bytes.clone()
    }

    /// Number of payload channels shut down so far
    pub fn outputs_closed(&self) -> usize {
        lock(&self.body).outputs_closed
    }
}

impl ResponseSink for BufferedResponse {
    type Output = OutputChannel;

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    fn send_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn write(&mut self, body: &str) {
        lock(&self.body).bytes.extend_from_slice(body.as_bytes());
    }

    fn open_output(&mut self) -> OutputChannel {
        OutputChannel {
            body: Arc::clone(&self.body),
            closed: false,
        }
    }

    fn is_committed(&self) -> bool {
        !lock(&self.body).bytes.is_empty()
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        let bytes = std::mem::take(&mut lock(&self.body).bytes);
        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Payload channel of a [`BufferedResponse`]
#[derive(Debug)]
pub struct OutputChannel {
    body: Arc<Mutex<BodyBuffer>>,
    closed: bool,
}

impl AsyncWrite for OutputChannel {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if self.closed {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "response output already closed",
            )));
        }
        lock(&self.body).bytes.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        if !self.closed {
            self.closed = true;
            lock(&self.body).outputs_closed += 1;
        }
        Poll::Ready(Ok(()))
    }
}

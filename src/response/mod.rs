//! HTTP response sinks
//!
//! The adapter writes status, headers and payload through [`ResponseSink`];
//! [`BufferedResponse`] is the implementation handed to axum handlers.

mod buffered;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use tokio::io::AsyncWrite;

pub use buffered::{BufferedResponse, OutputChannel};

/// Response surface of one HTTP request
pub trait ResponseSink: Send {
    /// Byte channel carrying the response payload
    type Output: AsyncWrite + Send + Unpin + 'static;

    /// Set a header, replacing any previous value
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    fn send_status(&mut self, status: StatusCode);

    /// Append plaintext to the response body
    fn write(&mut self, body: &str);

    /// Open the payload channel. The caller shuts it down when done.
    fn open_output(&mut self) -> Self::Output;

    /// Whether body bytes have already been written
    fn is_committed(&self) -> bool;
}

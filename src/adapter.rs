//! Response adapter
//!
//! Streams stored files and page assets into HTTP responses. Storage
//! failures are reported to the client as a status code with a short
//! plaintext body, then returned to the caller.

use std::future::Future;
use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue};
use tokio::io::AsyncWriteExt;

use crate::error::{ErrorKind, Result, StorageError};
use crate::mapper::{DocContentFilenameMapper, PopplerFilenameMapper};
use crate::response::ResponseSink;
use crate::storage::{Doc, File, StorageIo};

const PDF_CONTENT_TYPE: &str = "application/pdf";
const PNG_CONTENT_TYPE: &str = "image/png";
const ATTACHMENT_DISPOSITION: &str = "attachment; filename=\"doc.pdf\"";

pub struct ResponseAdapter {
    io: Arc<dyn StorageIo>,
    mapper: Arc<dyn DocContentFilenameMapper>,
}

impl ResponseAdapter {
    /// Create an adapter over `io`, naming page assets with `mapper`
    /// or with [`PopplerFilenameMapper`] when none is given.
    pub fn new(io: Arc<dyn StorageIo>, mapper: Option<Arc<dyn DocContentFilenameMapper>>) -> Self {
        Self {
            io,
            mapper: mapper.unwrap_or_else(|| Arc::new(PopplerFilenameMapper)),
        }
    }

    /// Send a stored PDF file, returning the number of payload bytes written.
    ///
    /// With `as_attachment` the response carries a `Content-Disposition`
    /// asking the client to save it as `doc.pdf`.
    pub async fn file_to_response<R: ResponseSink>(
        &self,
        file: &File,
        response: &mut R,
        as_attachment: bool,
    ) -> Result<u64> {
        let info = try_in_http_context(response, self.io.file_info(file).await)?;

        let mut headers = vec![
            (header::CONTENT_LENGTH, HeaderValue::from(info.size)),
            (header::CONTENT_TYPE, HeaderValue::from_static(PDF_CONTENT_TYPE)),
        ];
        if as_attachment {
            headers.push((
                header::CONTENT_DISPOSITION,
                HeaderValue::from_static(ATTACHMENT_DISPOSITION),
            ));
        }

        let io = &self.io;
        let copied = http_send(response, headers, |mut out| async move {
            let result = io.read_file(file, &mut out).await;
            (out, result)
        })
        .await?;

        tracing::debug!(file_id = %file.id(), bytes = copied, "Sent file");
        Ok(copied)
    }

    /// Send the background image of page `page_num` of `doc`
    pub async fn doc_page_background_to_response<R: ResponseSink>(
        &self,
        doc: &Doc,
        page_num: u32,
        response: &mut R,
    ) -> Result<u64> {
        let headers = vec![(header::CONTENT_TYPE, HeaderValue::from_static(PNG_CONTENT_TYPE))];

        let copied = http_send(response, headers, |mut out| async move {
            let result = self.read_page_background(doc, page_num, &mut out).await;
            (out, result)
        })
        .await?;

        tracing::debug!(doc_id = %doc.id(), page = page_num, bytes = copied, "Sent page background");
        Ok(copied)
    }

    async fn read_page_background<W>(&self, doc: &Doc, page_num: u32, out: &mut W) -> Result<u64>
    where
        W: tokio::io::AsyncWrite + Send + Unpin + 'static,
    {
        let mut reader = self.io.read_context_for(doc).await?;
        let copied = reader
            .read_doc_data(&self.mapper.bgr_filename(page_num), out)
            .await;

        // Released on every path; a read failure takes precedence over a close failure
        match reader.close().await {
            Ok(()) => copied,
            Err(err) => {
                tracing::warn!(doc_id = %doc.id(), error = %err, "Failed to release read context");
                copied.and(Err(err))
            }
        }
    }
}

/// Apply `headers`, then run `producer` against the response output.
///
/// The output is shut down exactly once, after any failure has been reported
/// to the client.
async fn http_send<R, F, Fut>(
    response: &mut R,
    headers: Vec<(HeaderName, HeaderValue)>,
    producer: F,
) -> Result<u64>
where
    R: ResponseSink,
    F: FnOnce(R::Output) -> Fut,
    Fut: Future<Output = (R::Output, Result<u64>)>,
{
    for (name, value) in headers {
        response.set_header(name, value);
    }

    let (mut out, result) = producer(response.open_output()).await;
    let result = try_in_http_context(response, result);

    if let Err(err) = out.shutdown().await {
        tracing::warn!(error = %err, "Failed to close response output");
    }

    result
}

/// Report a failed unit of work to the client and hand the error back
fn try_in_http_context<R: ResponseSink, T>(response: &mut R, result: Result<T>) -> Result<T> {
    result.map_err(|err| {
        notify_client(response, &err);
        err
    })
}

fn notify_client<R: ResponseSink>(response: &mut R, err: &StorageError) {
    let kind = err.kind();
    let (status, message) = kind.response_parts();

    match kind {
        ErrorKind::Internal => tracing::error!(status = %status, error = %err, "Storage failure"),
        _ => tracing::warn!(status = %status, error = %err, "Storage request refused"),
    }

    // Once payload bytes are out, a second status would corrupt the response
    if response.is_committed() {
        tracing::warn!(status = %status, "Response already committed, not sending error status");
        return;
    }

    response.send_status(status);
    response.write(message);
}

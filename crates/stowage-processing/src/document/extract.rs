//! Best-effort PDF text extraction.
//!
//! Extraction never fails the caller: any parser error (or parser panic) is logged and
//! reported as `None`.

/// Extract the text of an in-memory PDF.
#[cfg(feature = "document")]
pub fn extract_text(buffer: &[u8]) -> Option<String> {
    if buffer.is_empty() {
        tracing::warn!("PDF text extraction skipped: empty buffer");
        return None;
    }

    let outcome = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(buffer));

    match outcome {
        Ok(Ok(text)) => {
            tracing::debug!(text_len = text.len(), "PDF text extracted");
            Some(text)
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, size_bytes = buffer.len(), "PDF text extraction failed");
            None
        }
        Err(_) => {
            tracing::warn!(size_bytes = buffer.len(), "PDF parser panicked during text extraction");
            None
        }
    }
}

#[cfg(not(feature = "document"))]
pub fn extract_text(buffer: &[u8]) -> Option<String> {
    tracing::debug!(
        size_bytes = buffer.len(),
        "PDF text extraction disabled (build without the `document` feature)"
    );
    None
}

/// Run [`extract_text`] on the blocking pool.
pub async fn extract_text_async(buffer: bytes::Bytes) -> Option<String> {
    match tokio::task::spawn_blocking(move || extract_text(&buffer)).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "PDF text extraction task failed");
            None
        }
    }
}

//! Log archive retrieval.
//!
//! Downloads an hourly log archive from its pre-signed object-storage URL,
//! decompresses the gzip payload as a stream, and parses the
//! newline-delimited JSON content into normalized [`LogEntry`] values.
//!
//! The fetch deliberately uses its own bare HTTP client: the pre-signed
//! URL embeds its authentication in the query string, and any added header
//! (authorization, content-type, anything a general-purpose client injects
//! by default) can invalidate the signature.

use super::swo::{LogEntry, SwoError};
use flate2::write::GzDecoder;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Upper bound on the whole download, connect through body.
pub const ARCHIVE_TIMEOUT_SECS: u64 = 120;

/// Download a log archive and parse its entries.
///
/// When `limit` is set, only the first `limit` lines are parsed at all,
/// bounding both time and memory cost. A malformed line is logged and
/// skipped; it never aborts the batch.
#[instrument(skip(download_url))]
pub async fn download_and_unzip_archive(
    download_url: &str,
    limit: Option<usize>,
) -> Result<Vec<LogEntry>, SwoError> {
    debug!(
        url = %download_url.chars().take(100).collect::<String>(),
        "Downloading archive"
    );

    // Bare client: no default headers, fixed overall timeout. Must stay
    // separate from the authenticated API client.
    let client = Client::builder()
        .timeout(Duration::from_secs(ARCHIVE_TIMEOUT_SECS))
        .build()
        .expect("Failed to build HTTP client");

    let response = client.get(download_url).send().await.map_err(map_timeout)?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(SwoError::ArchiveDownload(format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("unknown status")
        )));
    }

    // Decompress chunk by chunk; memory tracks the chunk size, while the
    // decompressed text is materialized once for line splitting.
    let mut decoder = GzDecoder::new(Vec::new());
    let mut stream = response.bytes_stream();
    let mut compressed_size = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_timeout)?;
        compressed_size += chunk.len();
        decoder
            .write_all(&chunk)
            .map_err(|e| SwoError::ArchiveDownload(format!("gzip decode failed: {}", e)))?;
    }

    let decompressed = decoder
        .finish()
        .map_err(|e| SwoError::ArchiveDownload(format!("gzip decode failed: {}", e)))?;
    let text = String::from_utf8_lossy(&decompressed);

    debug!(
        compressed_size,
        decompressed_size = text.len(),
        "Archive decompressed"
    );

    Ok(parse_entries(&text, limit))
}

fn map_timeout(error: reqwest::Error) -> SwoError {
    if error.is_timeout() {
        SwoError::DownloadTimeout(ARCHIVE_TIMEOUT_SECS)
    } else {
        SwoError::RequestFailed(error)
    }
}

/// Parse newline-delimited JSON into log entries.
///
/// Each line parses independently through the shared normalization in
/// [`LogEntry::from_raw`], so archive entries and live-search entries
/// resolve their fields identically.
pub(crate) fn parse_entries(decompressed: &str, limit: Option<usize>) -> Vec<LogEntry> {
    let take = limit.unwrap_or(usize::MAX);
    let mut entries = Vec::new();

    for (index, line) in decompressed.trim().lines().take(take).enumerate() {
        match serde_json::from_str::<serde_json::Value>(line) {
            Ok(raw) => entries.push(LogEntry::from_raw(&raw)),
            Err(e) => warn!(line = index, error = %e, "Skipping malformed archive entry"),
        }
    }

    entries
}

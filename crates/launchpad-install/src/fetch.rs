//! Archive retrieval with streaming progress (spec §4.6).
//!
//! The progress observer is a plain closure rather than a trait object with
//! a registration API: the fetcher is the only thing that knows when to
//! throttle updates, and the caller (CLI in shell-integration mode vs.
//! direct-install mode) just decides where the observer writes to.

use std::path::Path;

use thiserror::Error;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server returned HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("stream error while downloading {url}: {source}")]
    Stream {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to write {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A progress event emitted during a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// `Content-Length` was known; `percent` is rounded to the nearest 5.
    Update {
        bytes_received: u64,
        total_bytes: u64,
        percent: u8,
    },
    /// `Content-Length` was absent; emitted exactly once.
    Unknown,
    /// The transfer finished; callers use this to clear a progress line.
    Done,
}

fn round_to_nearest_5(percent: f64) -> u8 {
    ((percent / 5.0).round() * 5.0) as u8
}

/// Stream `url` to `dest_path`, invoking `on_progress` as data arrives.
/// Updates are throttled to one per percent-bucket (every 5%) when the
/// total size is known.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    dest_path: &Path,
    mut on_progress: impl FnMut(Progress),
) -> Result<(), FetchError> {
    let response = client.get(url).send().await.map_err(|source| FetchError::Network {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if status.as_u16() >= 400 {
        return Err(FetchError::Http {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let total_bytes = response.content_length();
    if total_bytes.is_none() {
        on_progress(Progress::Unknown);
    }

    let mut file = tokio::fs::File::create(dest_path)
        .await
        .map_err(|source| FetchError::Io {
            path: dest_path.to_path_buf(),
            source,
        })?;

    let mut received: u64 = 0;
    let mut last_bucket: i64 = -1;
    let mut stream = response.bytes_stream();

    use futures::StreamExt;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| FetchError::Stream {
            url: url.to_string(),
            source,
        })?;
        file.write_all(&chunk).await.map_err(|source| FetchError::Io {
            path: dest_path.to_path_buf(),
            source,
        })?;
        received += chunk.len() as u64;

        if let Some(total) = total_bytes {
            if total > 0 {
                let percent = round_to_nearest_5(received as f64 / total as f64 * 100.0);
                let bucket = percent as i64;
                if bucket != last_bucket {
                    last_bucket = bucket;
                    on_progress(Progress::Update {
                        bytes_received: received,
                        total_bytes: total,
                        percent,
                    });
                }
            }
        }
    }

    file.flush().await.map_err(|source| FetchError::Io {
        path: dest_path.to_path_buf(),
        source,
    })?;
    on_progress(Progress::Done);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_nearest_five() {
        assert_eq!(round_to_nearest_5(0.0), 0);
        assert_eq!(round_to_nearest_5(2.4), 0);
        assert_eq!(round_to_nearest_5(2.6), 5);
        assert_eq!(round_to_nearest_5(97.6), 100);
    }
}

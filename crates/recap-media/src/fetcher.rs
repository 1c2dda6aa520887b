// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment fetching.

use recap_core::types::{Attachment, MediaPayload};
use tracing::{debug, info, warn};

use crate::{is_supported_media, mime_from_extension};

/// General per-attachment size cap.
const MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;
/// Raised cap for video-typed attachments.
const MAX_VIDEO_SIZE: u64 = 100 * 1024 * 1024;

/// Why an attachment was rejected before download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Declared size exceeds the category cap.
    TooLarge { size: u64, cap: u64 },
    /// Resolved MIME type (or lack of one) is not in the supported sets.
    UnsupportedType { mime: Option<String> },
}

/// Result of a fetch attempt.
///
/// `Rejected` and `Failed` are distinct so the assembler can word the
/// inline note differently for policy rejections versus transport faults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched(MediaPayload),
    Rejected(RejectReason),
    Failed(String),
}

/// Downloads, type-checks, and size-checks attachments.
#[derive(Debug, Clone, Default)]
pub struct MediaFetcher {
    client: reqwest::Client,
}

impl MediaFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches one attachment.
    ///
    /// Policy order matches the checks' cost: declared size first, then
    /// MIME resolution against the fixed table, and only then the download.
    /// No outcome here is an error; the caller renders all three variants.
    pub async fn fetch(&self, attachment: &Attachment) -> FetchOutcome {
        let cap = if attachment
            .content_type
            .as_deref()
            .is_some_and(|t| t.contains("video"))
        {
            MAX_VIDEO_SIZE
        } else {
            MAX_FILE_SIZE
        };
        if attachment.size > cap {
            warn!(
                filename = %attachment.filename,
                size = attachment.size,
                cap,
                "attachment too large"
            );
            return FetchOutcome::Rejected(RejectReason::TooLarge {
                size: attachment.size,
                cap,
            });
        }

        let mime = attachment
            .content_type
            .clone()
            .or_else(|| mime_from_extension(&attachment.filename).map(str::to_string));
        let mime = match mime {
            Some(ref m) if is_supported_media(m) => m.clone(),
            other => {
                debug!(
                    filename = %attachment.filename,
                    mime = other.as_deref().unwrap_or("<none>"),
                    "unsupported media type"
                );
                return FetchOutcome::Rejected(RejectReason::UnsupportedType { mime: other });
            }
        };

        let response = match self.client.get(&attachment.url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(filename = %attachment.filename, error = %e, "attachment download failed");
                return FetchOutcome::Failed(e.to_string());
            }
        };

        if !response.status().is_success() {
            warn!(
                filename = %attachment.filename,
                status = %response.status(),
                "attachment download returned non-success status"
            );
            return FetchOutcome::Failed(format!("HTTP {}", response.status()));
        }

        match response.bytes().await {
            Ok(bytes) => {
                info!(
                    filename = %attachment.filename,
                    size = bytes.len(),
                    mime = %mime,
                    "downloaded attachment"
                );
                FetchOutcome::Fetched(MediaPayload {
                    data: bytes.to_vec(),
                    mime_type: mime,
                })
            }
            Err(e) => {
                warn!(filename = %attachment.filename, error = %e, "attachment body read failed");
                FetchOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn attachment(filename: &str, content_type: Option<&str>, size: u64, url: &str) -> Attachment {
        Attachment {
            filename: filename.into(),
            content_type: content_type.map(str::to_string),
            size,
            url: url.into(),
        }
    }

    #[tokio::test]
    async fn fetches_supported_image() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cat.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let fetcher = MediaFetcher::new();
        let att = attachment(
            "cat.png",
            Some("image/png"),
            3,
            &format!("{}/cat.png", server.uri()),
        );

        match fetcher.fetch(&att).await {
            FetchOutcome::Fetched(payload) => {
                assert_eq!(payload.data, vec![1, 2, 3]);
                assert_eq!(payload.mime_type, "image/png");
            }
            other => panic!("expected Fetched, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resolves_mime_from_extension_when_undeclared() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 4]))
            .mount(&server)
            .await;

        let fetcher = MediaFetcher::new();
        let att = attachment("clip.webm", None, 4, &server.uri());

        match fetcher.fetch(&att).await {
            FetchOutcome::Fetched(payload) => assert_eq!(payload.mime_type, "video/webm"),
            other => panic!("expected Fetched, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_oversized_without_download() {
        // No mock server at all: a size rejection must not attempt HTTP.
        let fetcher = MediaFetcher::new();
        let att = attachment(
            "big.png",
            Some("image/png"),
            MAX_FILE_SIZE + 1,
            "http://127.0.0.1:9/unreachable",
        );

        match fetcher.fetch(&att).await {
            FetchOutcome::Rejected(RejectReason::TooLarge { size, cap }) => {
                assert_eq!(size, MAX_FILE_SIZE + 1);
                assert_eq!(cap, MAX_FILE_SIZE);
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn video_gets_raised_cap() {
        let fetcher = MediaFetcher::new();
        let att = attachment(
            "movie.mp4",
            Some("video/mp4"),
            MAX_FILE_SIZE + 1,
            "http://127.0.0.1:9/unreachable",
        );

        // Over the general cap but under the video cap: passes the size
        // check and fails later at download (unreachable host).
        match fetcher.fetch(&att).await {
            FetchOutcome::Failed(_) => {}
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_unsupported_type() {
        let fetcher = MediaFetcher::new();
        let att = attachment("doc.pdf", Some("application/pdf"), 100, "http://unused");

        match fetcher.fetch(&att).await {
            FetchOutcome::Rejected(RejectReason::UnsupportedType { mime }) => {
                assert_eq!(mime.as_deref(), Some("application/pdf"));
            }
            other => panic!("expected UnsupportedType, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_success_status_is_failed_not_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = MediaFetcher::new();
        let att = attachment("gone.png", Some("image/png"), 10, &server.uri());

        match fetcher.fetch(&att).await {
            FetchOutcome::Failed(msg) => assert!(msg.contains("404"), "got: {msg}"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}

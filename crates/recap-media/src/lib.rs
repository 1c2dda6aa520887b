// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media policy and download for message attachments.
//!
//! Attachments pass a declared-size check and a MIME allow-list before any
//! bytes are fetched. Rejections and download failures are routine outcomes
//! the assembler turns into inline notes, never errors that abort assembly.

pub mod fetcher;

pub use fetcher::{FetchOutcome, MediaFetcher, RejectReason};

/// MIME types the provider accepts per category.
const SUPPORTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];
const SUPPORTED_VIDEO_TYPES: &[&str] = &["video/mp4", "video/mpeg", "video/quicktime", "video/webm"];
const SUPPORTED_AUDIO_TYPES: &[&str] = &["audio/mpeg", "audio/wav", "audio/ogg", "audio/webm"];

/// Infers a MIME type from the filename extension using a fixed table.
pub fn mime_from_extension(filename: &str) -> Option<&'static str> {
    let ext = filename.rsplit('.').next()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mpeg" | "mpg" => "video/mpeg",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "weba" => "audio/webm",
        "m4a" => "audio/mp4",
        _ => return None,
    };
    Some(mime)
}

/// Whether the resolved MIME type is in one of the supported sets.
pub fn is_supported_media(mime: &str) -> bool {
    SUPPORTED_IMAGE_TYPES.contains(&mime)
        || SUPPORTED_VIDEO_TYPES.contains(&mime)
        || SUPPORTED_AUDIO_TYPES.contains(&mime)
}

/// Human-readable category name used in attribution lines.
pub fn media_category(mime: &str) -> &'static str {
    if mime.starts_with("image") {
        "Image"
    } else if mime.starts_with("video") {
        "Video"
    } else if mime.starts_with("audio") {
        "Audio"
    } else {
        "Media"
    }
}

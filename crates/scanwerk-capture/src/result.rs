// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The canonical output of a successful capture.

use chrono::{DateTime, Utc};
use serde::Serialize;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{PixelDimensions, RawAsset, SourceKind, default_display_name};

use crate::encode::decoded_len;

/// A captured, admitted and encoded document image.
///
/// Only the pipeline controller builds these, after admission succeeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureResult {
    uri: String,
    mime_type: String,
    display_name: String,
    size_bytes: u64,
    size_is_estimate: bool,
    portable_encoding: Option<String>,
    pixel_dimensions: Option<PixelDimensions>,
    source: SourceKind,
    captured_at: DateTime<Utc>,
}

impl CaptureResult {
    pub(crate) fn from_admitted(
        asset: RawAsset,
        source: SourceKind,
        captured_at: DateTime<Utc>,
    ) -> Result<Self> {
        let portable_encoding = asset.inline_encoding().map(str::to_owned);
        let uri = asset
            .payload()
            .preview_uri()
            .or_else(|| portable_encoding.clone())
            .ok_or_else(|| {
                ScanwerkError::EncodingFailed("asset has no previewable reference".into())
            })?;

        let (size_bytes, size_is_estimate) = match asset.declared_size_bytes() {
            Some(size) => (size, asset.size_is_estimate()),
            None => (
                portable_encoding.as_deref().map(decoded_len).unwrap_or(0),
                true,
            ),
        };

        let display_name = asset
            .display_name()
            .map(str::to_owned)
            .unwrap_or_else(|| default_display_name(captured_at));

        Ok(Self {
            uri,
            mime_type: asset.declared_mime_type().to_owned(),
            display_name,
            size_bytes,
            size_is_estimate,
            portable_encoding,
            pixel_dimensions: asset.pixel_dimensions(),
            source,
            captured_at,
        })
    }

    /// Reference suitable for preview rendering.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// May be an estimate; see [`CaptureResult::size_is_estimate`].
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn size_is_estimate(&self) -> bool {
        self.size_is_estimate
    }

    pub fn portable_encoding(&self) -> Option<&str> {
        self.portable_encoding.as_deref()
    }

    pub fn pixel_dimensions(&self) -> Option<PixelDimensions> {
        self.pixel_dimensions
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanwerk_core::types::Payload;
    use std::path::PathBuf;

    fn at() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    #[test]
    fn file_payload_previews_by_path() {
        let asset = RawAsset::new(Payload::Path(PathBuf::from("/tmp/a.png")), "image/png")
            .unwrap()
            .with_size(10)
            .with_inline_encoding("data:image/png;base64,AAAA");
        let result = CaptureResult::from_admitted(asset, SourceKind::FilePicker, at()).unwrap();
        assert_eq!(result.uri(), "file:///tmp/a.png");
        assert_eq!(result.display_name(), "scan_1700000000000");
        assert_eq!(result.size_bytes(), 10);
        assert!(!result.size_is_estimate());
    }

    #[test]
    fn in_memory_payload_previews_by_data_uri() {
        let asset = RawAsset::new(Payload::Bytes(vec![0; 3]), "image/jpeg")
            .unwrap()
            .with_inline_encoding("data:image/jpeg;base64,AAAA")
            .with_display_name("scan_1.jpg");
        let result = CaptureResult::from_admitted(asset, SourceKind::LiveCamera, at()).unwrap();
        assert_eq!(result.uri(), "data:image/jpeg;base64,AAAA");
        assert_eq!(result.display_name(), "scan_1.jpg");
        assert_eq!(result.size_bytes(), 3);
        assert!(result.size_is_estimate());
    }

    #[test]
    fn unencoded_bytes_cannot_be_previewed() {
        let asset = RawAsset::new(Payload::Bytes(vec![1]), "image/jpeg").unwrap();
        assert!(CaptureResult::from_admitted(asset, SourceKind::LiveCamera, at()).is_err());
    }
}

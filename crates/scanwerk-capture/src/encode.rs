// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Portable encoding — binary payload to `data:<mime>;base64,...` text.
//
// Runs after admission, so the size ceiling bounds how much is read into
// memory for assets that declared a size.

use std::io::Cursor;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use scanwerk_bridge::traits::NativeAssetReader;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{Payload, PixelDimensions, RawAsset};
use tracing::{debug, info, instrument, warn};

/// Build a data URI for `bytes`.
pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Put a platform-supplied base64 string into data-URI form.
pub fn normalize_inline(mime_type: &str, encoded: &str) -> String {
    if encoded.starts_with("data:") {
        encoded.to_owned()
    } else {
        format!("data:{mime_type};base64,{encoded}")
    }
}

/// Decoded length of a data URI or bare base64 string, without decoding it.
pub fn decoded_len(encoded: &str) -> u64 {
    let body = match encoded.split_once(";base64,") {
        Some((_, body)) => body,
        None => encoded,
    };
    let padding = body.bytes().rev().take_while(|b| *b == b'=').count();
    ((body.len() / 4 * 3).saturating_sub(padding)) as u64
}

/// Read just enough of the image header to learn its dimensions.
pub fn probe_dimensions(bytes: &[u8]) -> Option<PixelDimensions> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    let (width, height) = reader.into_dimensions().ok()?;
    Some(PixelDimensions::new(width, height))
}

/// Produces the portable encoding for assets that arrive without one.
#[derive(Clone, Default)]
pub struct Encoder {
    reader: Option<Arc<dyn NativeAssetReader>>,
    size_ceiling: Option<u64>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reader for platform handles (`content://`, `ph://`).
    pub fn with_reader(mut self, reader: Arc<dyn NativeAssetReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Warn when an asset of unknown size turns out larger than this.
    pub fn with_size_ceiling(mut self, bytes: u64) -> Self {
        self.size_ceiling = Some(bytes);
        self
    }

    /// Fill whatever this encoder leaves unset from `base`.
    pub(crate) fn inherit(self, base: &Encoder) -> Self {
        Self {
            reader: self.reader.or_else(|| base.reader.clone()),
            size_ceiling: self.size_ceiling.or(base.size_ceiling),
        }
    }

    /// Return `asset` with an inline encoding, reading the payload if needed.
    ///
    /// Assets that already carry one are returned untouched.
    #[instrument(skip_all, fields(mime = asset.declared_mime_type()))]
    pub async fn ensure_encoding(&self, asset: RawAsset) -> Result<RawAsset> {
        if asset.inline_encoding().is_some() {
            debug!("inline encoding present, skipping");
            return Ok(asset);
        }

        let bytes = self.read_payload(asset.payload()).await?;
        let actual = bytes.len() as u64;

        let mut asset = match asset.declared_size_bytes() {
            Some(_) => asset,
            None => {
                if let Some(limit) = self.size_ceiling.filter(|limit| actual > *limit) {
                    warn!(actual, limit, "asset of undeclared size exceeds the ceiling");
                }
                asset.with_size(actual)
            }
        };

        if asset.pixel_dimensions().is_none() {
            if let Some(dimensions) = probe_dimensions(&bytes) {
                asset = asset.with_dimensions(dimensions);
            }
        }

        let encoded = encode_data_uri(asset.declared_mime_type(), &bytes);
        info!(bytes = actual, encoded_len = encoded.len(), "payload encoded");
        Ok(asset.with_inline_encoding(encoded))
    }

    async fn read_payload(&self, payload: &Payload) -> Result<Vec<u8>> {
        let read = match payload {
            Payload::Bytes(bytes) => Ok(bytes.clone()),
            Payload::Path(path) => tokio::fs::read(path).await.map_err(ScanwerkError::from),
            Payload::Handle(uri) => match (uri.strip_prefix("file://"), &self.reader) {
                (Some(path), _) => tokio::fs::read(path).await.map_err(ScanwerkError::from),
                (None, Some(reader)) => reader.read_handle(uri).await,
                (None, None) => Err(ScanwerkError::Bridge(format!(
                    "no reader for handle {uri}"
                ))),
            },
        };
        read.map_err(|err| ScanwerkError::EncodingFailed(err.to_string()))
    }
}

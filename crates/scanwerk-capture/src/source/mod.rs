// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source adapters — one per acquisition channel, all behind `SourceAdapter`.

pub mod gallery;
pub mod live;
pub mod native_camera;
pub mod picker;

use std::future::Future;

use async_trait::async_trait;
use chrono::Utc;
use scanwerk_bridge::traits::{PickedImage, PickerOutcome};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{PixelDimensions, RawAsset, SourceKind};
use tokio_util::sync::CancellationToken;

use crate::encode::normalize_inline;

pub use gallery::GallerySource;
pub use live::{LiveCameraSource, LiveStreamGuard, ShutterButton};
pub use native_camera::NativeCameraSource;
pub use picker::FilePickerSource;

/// MIME type used when a platform hands back an asset without one. It is
/// never on an allow-list, so such assets fail admission by type.
pub const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

/// One acquisition channel.
///
/// `acquire` resolves with exactly one asset, or fails with
/// `AcquisitionCancelled` (user backed out, or `abort` fired) or
/// `AcquisitionFailed` (hardware/IO fault).
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn acquire(&self, abort: &CancellationToken) -> Result<RawAsset>;
}

/// Run `fut` unless `abort` fires first.
pub(crate) async fn abortable<T>(
    abort: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = abort.cancelled() => Err(ScanwerkError::AcquisitionCancelled),
        out = fut => out,
    }
}

/// Fold bridge errors into the acquisition taxonomy.
pub(crate) fn acquisition_error(kind: SourceKind, err: ScanwerkError) -> ScanwerkError {
    match err {
        ScanwerkError::AcquisitionCancelled | ScanwerkError::AcquisitionFailed(_) => err,
        other => ScanwerkError::AcquisitionFailed(format!("{kind}: {other}")),
    }
}

/// Normalise a single-shot picker result. Cancelled or empty → cancelled.
pub(crate) fn single_pick(kind: SourceKind, outcome: PickerOutcome) -> Result<RawAsset> {
    match outcome.into_first() {
        Some(picked) => asset_from_picked(picked),
        None => {
            tracing::info!(source = %kind, "picker returned nothing");
            Err(ScanwerkError::AcquisitionCancelled)
        }
    }
}

pub(crate) fn asset_from_picked(picked: PickedImage) -> Result<RawAsset> {
    let mime = picked
        .mime_type
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_MIME_TYPE.to_owned());

    let mut asset = RawAsset::new(picked.payload, mime)?;
    if let Some(size) = picked.file_size {
        asset = asset.with_size(size);
    }
    if let (Some(width), Some(height)) = (picked.width, picked.height) {
        asset = asset.with_dimensions(PixelDimensions::new(width, height));
    }
    if let Some(name) = picked.file_name {
        asset = asset.with_display_name(name);
    }
    if let Some(b64) = picked.base64 {
        let inline = normalize_inline(asset.declared_mime_type(), &b64);
        asset = asset.with_inline_encoding(inline);
    }
    Ok(asset)
}

/// `scan_<unix millis>.jpg`, the name given to live frames.
pub(crate) fn frame_name() -> String {
    format!("{}.jpg", scanwerk_core::types::default_display_name(Utc::now()))
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One-shot system camera source.

use std::sync::Arc;

use async_trait::async_trait;
use scanwerk_bridge::traits::NativeCamera;
use scanwerk_core::error::Result;
use scanwerk_core::types::{RawAsset, SourceKind};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::{SourceAdapter, abortable, acquisition_error, single_pick};

pub struct NativeCameraSource<B: ?Sized> {
    bridge: Arc<B>,
    quality: f32,
}

impl<B: NativeCamera + ?Sized> NativeCameraSource<B> {
    pub fn new(bridge: Arc<B>, quality: f32) -> Self {
        Self {
            bridge,
            quality: quality.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl<B: NativeCamera + ?Sized> SourceAdapter for NativeCameraSource<B> {
    fn kind(&self) -> SourceKind {
        SourceKind::NativeCamera
    }

    #[instrument(skip_all, fields(source = "native-camera"))]
    async fn acquire(&self, abort: &CancellationToken) -> Result<RawAsset> {
        info!(quality = self.quality, "launching system camera");
        let outcome = abortable(abort, self.bridge.capture_image(self.quality))
            .await
            .map_err(|err| acquisition_error(SourceKind::NativeCamera, err))?;
        single_pick(SourceKind::NativeCamera, outcome)
    }
}

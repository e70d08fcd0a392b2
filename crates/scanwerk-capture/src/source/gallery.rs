// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Photo library source.

use std::sync::Arc;

use async_trait::async_trait;
use scanwerk_bridge::traits::NativeGallery;
use scanwerk_core::config::ValidationPolicy;
use scanwerk_core::error::Result;
use scanwerk_core::types::{RawAsset, SourceKind};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::{SourceAdapter, abortable, acquisition_error, single_pick};

pub struct GallerySource<B: ?Sized> {
    bridge: Arc<B>,
    extensions: Vec<&'static str>,
}

impl<B: NativeGallery + ?Sized> GallerySource<B> {
    /// The library picker is filtered to what `policy` would admit.
    pub fn new(bridge: Arc<B>, policy: &ValidationPolicy) -> Self {
        Self {
            bridge,
            extensions: policy.allowed_extensions(),
        }
    }
}

#[async_trait]
impl<B: NativeGallery + ?Sized> SourceAdapter for GallerySource<B> {
    fn kind(&self) -> SourceKind {
        SourceKind::Gallery
    }

    #[instrument(skip_all, fields(source = "gallery"))]
    async fn acquire(&self, abort: &CancellationToken) -> Result<RawAsset> {
        info!("opening image library");
        let outcome = abortable(abort, self.bridge.pick_from_gallery(&self.extensions))
            .await
            .map_err(|err| acquisition_error(SourceKind::Gallery, err))?;
        single_pick(SourceKind::Gallery, outcome)
    }
}

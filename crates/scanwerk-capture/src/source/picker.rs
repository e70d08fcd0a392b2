// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File chooser source.

use std::sync::Arc;

use async_trait::async_trait;
use scanwerk_bridge::traits::NativeFilePicker;
use scanwerk_core::config::ValidationPolicy;
use scanwerk_core::error::Result;
use scanwerk_core::types::{RawAsset, SourceKind};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::{SourceAdapter, abortable, acquisition_error, single_pick};

pub struct FilePickerSource<B: ?Sized> {
    bridge: Arc<B>,
    extensions: Vec<&'static str>,
}

impl<B: NativeFilePicker + ?Sized> FilePickerSource<B> {
    pub fn new(bridge: Arc<B>, policy: &ValidationPolicy) -> Self {
        Self {
            bridge,
            extensions: policy.allowed_extensions(),
        }
    }
}

#[async_trait]
impl<B: NativeFilePicker + ?Sized> SourceAdapter for FilePickerSource<B> {
    fn kind(&self) -> SourceKind {
        SourceKind::FilePicker
    }

    #[instrument(skip_all, fields(source = "file-picker"))]
    async fn acquire(&self, abort: &CancellationToken) -> Result<RawAsset> {
        info!(extensions = ?self.extensions, "opening file picker");
        let outcome = abortable(abort, self.bridge.pick_file(&self.extensions))
            .await
            .map_err(|err| acquisition_error(SourceKind::FilePicker, err))?;
        single_pick(SourceKind::FilePicker, outcome)
    }
}

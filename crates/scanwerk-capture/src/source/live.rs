// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Live camera stream source.
//
// The preview is opened when acquisition starts and a still frame is taken
// when the user presses the shutter. The stream is owned by a
// `LiveStreamGuard`, which releases the camera on drop, so every exit path
// (frame taken, abort, error, future dropped) gives the hardware back.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use scanwerk_bridge::traits::{CameraStream, CapturedFrame, FrameOptions, NativeCameraStream};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{Payload, PixelDimensions, RawAsset, SourceKind};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::{SourceAdapter, abortable, acquisition_error, frame_name};
use crate::encode::{decoded_len, normalize_inline};

/// Scoped ownership of an open camera stream.
pub struct LiveStreamGuard {
    stream: Box<dyn CameraStream>,
    live: Arc<AtomicBool>,
}

impl LiveStreamGuard {
    fn open<B: NativeCameraStream + ?Sized>(bridge: &B, live: Arc<AtomicBool>) -> Result<Self> {
        let stream = bridge.open_stream()?;
        live.store(true, Ordering::Release);
        debug!("camera stream opened");
        Ok(Self { stream, live })
    }

    async fn take_picture(&mut self, options: FrameOptions) -> Result<CapturedFrame> {
        self.stream.take_picture(options).await
    }

    fn release(&mut self) {
        if self.stream.is_active() {
            self.stream.stop();
        }
        if self.live.swap(false, Ordering::AcqRel) {
            debug!("camera stream released");
        }
    }
}

impl Drop for LiveStreamGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// UI handle that triggers a still capture on the running stream.
#[derive(Clone)]
pub struct ShutterButton {
    presses: Arc<watch::Sender<u64>>,
}

impl ShutterButton {
    /// Presses made while no stream is running are ignored.
    pub fn press(&self) {
        self.presses.send_modify(|count| *count = count.wrapping_add(1));
    }
}

/// Long-lived camera preview with a shutter.
pub struct LiveCameraSource<B: ?Sized> {
    bridge: Arc<B>,
    presses: Arc<watch::Sender<u64>>,
    live: Arc<AtomicBool>,
    options: FrameOptions,
}

impl<B: NativeCameraStream + ?Sized> LiveCameraSource<B> {
    pub fn new(bridge: Arc<B>, options: FrameOptions) -> Self {
        let (presses, _) = watch::channel(0);
        Self {
            bridge,
            presses: Arc::new(presses),
            live: Arc::new(AtomicBool::new(false)),
            options,
        }
    }

    pub fn shutter(&self) -> ShutterButton {
        ShutterButton {
            presses: Arc::clone(&self.presses),
        }
    }

    /// Whether the camera is currently held by this source.
    pub fn is_streaming(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Frames declare their real encoded length when it is known. Only a
    /// frame with neither bytes nor inline data falls back to an estimate.
    fn frame_to_asset(frame: CapturedFrame) -> Result<RawAsset> {
        let dimensions = PixelDimensions::new(frame.width, frame.height);
        let inline = frame
            .base64
            .map(|b64| normalize_inline("image/jpeg", &b64));
        let known_len = match (&frame.payload, &inline) {
            (Payload::Bytes(bytes), _) => Some(bytes.len() as u64),
            (_, Some(inline)) => Some(decoded_len(inline)),
            _ => None,
        };
        let mut asset = RawAsset::new(frame.payload, "image/jpeg")?;
        asset = match known_len {
            Some(len) => asset.with_size(len),
            None => asset.with_estimated_size(dimensions.rgba_bytes()),
        };
        asset = asset
            .with_dimensions(dimensions)
            .with_display_name(frame_name());
        if let Some(inline) = inline {
            asset = asset.with_inline_encoding(inline);
        }
        Ok(asset)
    }
}

#[async_trait]
impl<B: NativeCameraStream + ?Sized> SourceAdapter for LiveCameraSource<B> {
    fn kind(&self) -> SourceKind {
        SourceKind::LiveCamera
    }

    #[instrument(skip_all, fields(source = "live-camera"))]
    async fn acquire(&self, abort: &CancellationToken) -> Result<RawAsset> {
        let mut presses = self.presses.subscribe();
        presses.borrow_and_update();

        let mut guard = LiveStreamGuard::open(&*self.bridge, Arc::clone(&self.live))
            .map_err(|err| acquisition_error(SourceKind::LiveCamera, err))?;
        info!("live preview running, waiting for shutter");

        abortable(abort, async {
            presses.changed().await.map_err(|_| {
                ScanwerkError::AcquisitionFailed("camera stream: shutter disconnected".into())
            })
        })
        .await?;

        let frame = abortable(abort, guard.take_picture(self.options))
            .await
            .map_err(|err| acquisition_error(SourceKind::LiveCamera, err))?;
        guard.release();

        info!(width = frame.width, height = frame.height, "frame captured");
        Self::frame_to_asset(frame)
    }
}

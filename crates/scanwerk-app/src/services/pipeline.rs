// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Builds the capture controller for the current platform and reports its
// events on the terminal.

use std::sync::Arc;

use scanwerk_bridge::platform_bridge;
use scanwerk_bridge::traits::FrameOptions;
use scanwerk_capture::source::{
    FilePickerSource, GallerySource, LiveCameraSource, NativeCameraSource, ShutterButton,
};
use scanwerk_capture::{
    CapabilityBroker, CaptureObserver, CaptureResult, FailureNotice, Phase, PipelineController,
};
use scanwerk_core::AppConfig;
use scanwerk_core::types::SessionId;
use tracing::{debug, info};

/// Reports pipeline events through tracing and, for failures, on stderr.
pub struct TerminalObserver;

impl CaptureObserver for TerminalObserver {
    fn on_phase(&self, session: SessionId, phase: Phase) {
        debug!(%session, %phase, "session phase");
    }

    fn on_ready(&self, result: &CaptureResult) {
        info!(
            name = result.display_name(),
            mime = result.mime_type(),
            size = result.size_bytes(),
            estimated = result.size_is_estimate(),
            "document captured"
        );
    }

    fn on_failed(&self, notice: &FailureNotice) {
        eprintln!("{}", notice.message);
        if !notice.suggestion.is_empty() {
            eprintln!("  {}", notice.suggestion);
        }
    }
}

/// The wired pipeline plus the trigger for the live preview.
pub struct Pipeline {
    pub controller: PipelineController,
    pub shutter: ShutterButton,
}

/// A controller with every source the platform bridge knows about.
///
/// The capability query decides which of them are actually offered.
pub fn build_pipeline(config: &AppConfig) -> Pipeline {
    let bridge = platform_bridge();
    info!(platform = bridge.platform_name(), "platform bridge ready");

    let policy = Arc::new(config.policy.clone());
    let frame = FrameOptions {
        quality: config.camera_quality,
        base64: config.live_inline_base64,
    };

    let live = Arc::new(LiveCameraSource::new(Arc::clone(&bridge), frame));
    let shutter = live.shutter();

    let controller = PipelineController::new(
        CapabilityBroker::new(Arc::clone(&bridge)),
        Arc::clone(&policy),
    )
    .with_adapter(live)
    .with_adapter(Arc::new(NativeCameraSource::new(
        Arc::clone(&bridge),
        config.camera_quality,
    )))
    .with_adapter(Arc::new(GallerySource::new(Arc::clone(&bridge), &policy)))
    .with_adapter(Arc::new(FilePickerSource::new(bridge, &policy)))
    .with_observer(Arc::new(TerminalObserver));

    Pipeline {
        controller,
        shutter,
    }
}

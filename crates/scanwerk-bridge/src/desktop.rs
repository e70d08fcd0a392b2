// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desktop bridge for builds where native mobile APIs are unavailable.
//
// Camera channels report themselves unavailable. The gallery opens the
// native file dialog rooted at the user's pictures directory; the file
// picker opens it wherever the dialog last was.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::Payload;

use crate::traits::*;

/// Bridge returned on non-mobile platforms.
pub struct DesktopBridge {
    pictures_dir: Option<PathBuf>,
}

impl DesktopBridge {
    pub fn new() -> Self {
        Self {
            pictures_dir: pictures_dir(),
        }
    }
}

impl Default for DesktopBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// `$XDG_PICTURES_DIR`, then `$HOME/Pictures`, if it exists.
fn pictures_dir() -> Option<PathBuf> {
    let candidate = std::env::var_os("XDG_PICTURES_DIR")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join("Pictures")))?;
    candidate.is_dir().then_some(candidate)
}

/// Describe a local file the way a platform picker would.
pub fn picked_from_path(path: &Path) -> Result<PickedImage> {
    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(ScanwerkError::AcquisitionFailed(format!(
            "{} is not a file",
            path.display()
        )));
    }
    let mime_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_owned());
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());

    let mut picked = PickedImage::new(Payload::Path(path.to_path_buf()));
    picked.mime_type = mime_type;
    picked.file_size = Some(metadata.len());
    picked.file_name = file_name;
    Ok(picked)
}

async fn show_dialog(extensions: &[&str], directory: Option<&Path>) -> Result<PickerOutcome> {
    let mut dialog = rfd::AsyncFileDialog::new()
        .set_title("Scan Document")
        .add_filter("Images", extensions);
    if let Some(dir) = directory {
        dialog = dialog.set_directory(dir);
    }
    match dialog.pick_file().await {
        Some(handle) => {
            let picked = picked_from_path(handle.path())?;
            tracing::info!(path = %handle.path().display(), "file chosen");
            Ok(PickerOutcome::picked(picked))
        }
        None => Ok(PickerOutcome::cancelled()),
    }
}

impl PlatformBridge for DesktopBridge {
    fn platform_name(&self) -> &str {
        "Desktop"
    }
}

#[async_trait]
impl NativePermissions for DesktopBridge {
    fn camera_permission(&self) -> PermissionStatus {
        PermissionStatus::Denied
    }

    async fn request_camera_permission(&self) -> Result<bool> {
        tracing::debug!("camera permission requested on desktop bridge");
        Ok(false)
    }
}

#[async_trait]
impl NativeCamera for DesktopBridge {
    fn has_native_camera(&self) -> bool {
        false
    }

    async fn capture_image(&self, _quality: f32) -> Result<PickerOutcome> {
        tracing::warn!("NativeCamera::capture_image called on desktop bridge");
        Err(ScanwerkError::PlatformUnavailable)
    }
}

impl NativeCameraStream for DesktopBridge {
    fn supports_live_stream(&self) -> bool {
        false
    }

    fn open_stream(&self) -> Result<Box<dyn CameraStream>> {
        tracing::warn!("NativeCameraStream::open_stream called on desktop bridge");
        Err(ScanwerkError::PlatformUnavailable)
    }
}

#[async_trait]
impl NativeGallery for DesktopBridge {
    fn has_gallery(&self) -> bool {
        self.pictures_dir.is_some()
    }

    async fn pick_from_gallery(&self, extensions: &[&str]) -> Result<PickerOutcome> {
        let Some(dir) = self.pictures_dir.as_deref() else {
            return Err(ScanwerkError::PlatformUnavailable);
        };
        show_dialog(extensions, Some(dir)).await
    }
}

#[async_trait]
impl NativeFilePicker for DesktopBridge {
    fn has_file_picker(&self) -> bool {
        true
    }

    async fn pick_file(&self, extensions: &[&str]) -> Result<PickerOutcome> {
        show_dialog(extensions, None).await
    }
}

#[async_trait]
impl NativeAssetReader for DesktopBridge {
    async fn read_handle(&self, uri: &str) -> Result<Vec<u8>> {
        match uri.strip_prefix("file://") {
            Some(path) => Ok(tokio::fs::read(path).await?),
            None => Err(ScanwerkError::Bridge(format!(
                "desktop bridge cannot open handle {uri}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picked_file_reports_mime_size_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.png");
        std::fs::write(&path, [0u8; 42]).unwrap();

        let picked = picked_from_path(&path).unwrap();
        assert_eq!(picked.mime_type.as_deref(), Some("image/png"));
        assert_eq!(picked.file_size, Some(42));
        assert_eq!(picked.file_name.as_deref(), Some("receipt.png"));
        assert_eq!(picked.payload, Payload::Path(path));
    }

    #[test]
    fn unknown_extension_has_no_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.zzzunknown");
        std::fs::write(&path, b"x").unwrap();
        assert_eq!(picked_from_path(&path).unwrap().mime_type, None);
    }

    #[test]
    fn directory_is_not_a_pick() {
        let dir = tempfile::tempdir().unwrap();
        assert!(picked_from_path(dir.path()).is_err());
    }

    #[tokio::test]
    async fn file_handles_are_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, b"jpeg").unwrap();
        let bridge = DesktopBridge::new();
        let bytes = bridge
            .read_handle(&format!("file://{}", path.display()))
            .await
            .unwrap();
        assert_eq!(bytes, b"jpeg");
        assert!(bridge.read_handle("content://media/1").await.is_err());
    }

    #[test]
    fn cameras_are_unavailable() {
        let bridge = DesktopBridge::new();
        assert!(!bridge.has_native_camera());
        assert!(!bridge.supports_live_stream());
        assert!(matches!(
            bridge.open_stream(),
            Err(ScanwerkError::PlatformUnavailable)
        ));
    }
}

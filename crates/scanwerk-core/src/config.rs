// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration and the image admission policy.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanwerkError};

/// Ten mebibytes.
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// MIME types accepted out of the box.
pub const DEFAULT_ALLOWED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/jpg"];

/// Allowed-type / max-size rule set gating capture success.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicyFile", into = "PolicyFile")]
pub struct ValidationPolicy {
    allowed_mime_types: BTreeSet<String>,
    max_size_bytes: u64,
}

/// On-disk shape of the policy, checked on load.
#[derive(Serialize, Deserialize)]
struct PolicyFile {
    allowed_mime_types: Vec<String>,
    max_size_bytes: u64,
}

impl TryFrom<PolicyFile> for ValidationPolicy {
    type Error = ScanwerkError;

    fn try_from(file: PolicyFile) -> Result<Self> {
        Self::new(file.allowed_mime_types, file.max_size_bytes)
    }
}

impl From<ValidationPolicy> for PolicyFile {
    fn from(policy: ValidationPolicy) -> Self {
        Self {
            allowed_mime_types: policy.allowed_mime_types.into_iter().collect(),
            max_size_bytes: policy.max_size_bytes,
        }
    }
}

impl ValidationPolicy {
    /// Build a policy. MIME types are lowercased; the allow-list must not be
    /// empty and the ceiling must be positive.
    pub fn new<I, S>(allowed: I, max_size_bytes: u64) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_mime_types: BTreeSet<String> = allowed
            .into_iter()
            .map(|m| m.as_ref().trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty())
            .collect();
        if allowed_mime_types.is_empty() {
            return Err(ScanwerkError::Config(
                "allowed_mime_types must list at least one type".into(),
            ));
        }
        if max_size_bytes == 0 {
            return Err(ScanwerkError::Config(
                "max_size_bytes must be greater than zero".into(),
            ));
        }
        Ok(Self {
            allowed_mime_types,
            max_size_bytes,
        })
    }

    pub fn allows(&self, mime_type: &str) -> bool {
        self.allowed_mime_types.contains(mime_type)
    }

    pub fn allowed_mime_types(&self) -> impl Iterator<Item = &str> {
        self.allowed_mime_types.iter().map(String::as_str)
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// File extensions matching the allow-list, for filtering picker dialogs.
    pub fn allowed_extensions(&self) -> Vec<&'static str> {
        let mut exts: Vec<&'static str> = Vec::new();
        for mime in &self.allowed_mime_types {
            let matched: &[&'static str] = match mime.as_str() {
                "image/jpeg" | "image/jpg" => &["jpg", "jpeg"],
                "image/png" => &["png"],
                "image/gif" => &["gif"],
                "image/webp" => &["webp"],
                "image/bmp" => &["bmp"],
                "image/tiff" => &["tif", "tiff"],
                "image/heic" => &["heic"],
                _ => &[],
            };
            for ext in matched {
                if !exts.contains(ext) {
                    exts.push(ext);
                }
            }
        }
        exts
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|m| (*m).to_owned())
                .collect(),
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
        }
    }
}

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Admission policy applied to every captured image.
    pub policy: ValidationPolicy,
    /// JPEG quality hint passed to camera sources (0.0–1.0).
    pub camera_quality: f32,
    /// Ask the live stream for an inline base64 frame alongside the bytes.
    pub live_inline_base64: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            policy: ValidationPolicy::default(),
            camera_quality: 0.8,
            live_inline_base64: true,
        }
    }
}

impl AppConfig {
    /// Load settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(err.into()),
        };
        let config: Self = serde_json::from_str(&text)?;
        if !(0.0..=1.0).contains(&config.camera_quality) {
            return Err(ScanwerkError::Config(format!(
                "camera_quality must be within 0.0..=1.0, got {}",
                config.camera_quality
            )));
        }
        Ok(config)
    }

    /// Write settings as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_ten_megabyte_jpeg_png_policy() {
        let policy = ValidationPolicy::default();
        assert_eq!(policy.max_size_bytes(), 10_485_760);
        assert!(policy.allows("image/jpeg"));
        assert!(policy.allows("image/jpg"));
        assert!(policy.allows("image/png"));
        assert!(!policy.allows("image/gif"));
    }

    #[test]
    fn empty_allow_list_is_rejected() {
        let err = ValidationPolicy::new(Vec::<String>::new(), 10).unwrap_err();
        assert!(matches!(err, ScanwerkError::Config(_)));
    }

    #[test]
    fn zero_ceiling_is_rejected() {
        assert!(ValidationPolicy::new(["image/png"], 0).is_err());
    }

    #[test]
    fn extensions_cover_allowed_types_once() {
        let exts = ValidationPolicy::default().allowed_extensions();
        assert_eq!(exts.iter().filter(|e| **e == "jpg").count(), 1);
        assert!(exts.contains(&"png"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn save_then_load_preserves_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AppConfig {
            policy: ValidationPolicy::new(["IMAGE/WEBP"], 2048).unwrap(),
            ..AppConfig::default()
        };
        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        assert!(loaded.policy.allows("image/webp"));
        assert_eq!(loaded.policy.max_size_bytes(), 2048);
    }

    #[test]
    fn invalid_policy_in_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"policy":{"allowed_mime_types":[],"max_size_bytes":5}}"#,
        )
        .unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn only_capture_settings_are_persisted() {
        let json = serde_json::to_value(AppConfig::default()).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["camera_quality", "live_inline_base64", "policy"]);
    }

    #[test]
    fn stale_keys_in_file_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"data_dir_name":"elsewhere","camera_quality":0.5}"#).unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.camera_quality, 0.5);
        assert_eq!(config.policy, ValidationPolicy::default());
    }
}

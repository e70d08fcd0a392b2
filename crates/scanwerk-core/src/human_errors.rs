// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the capture flow.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives whether and how the UI shows the failure.

use crate::error::ScanwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user backed out themselves; show nothing.
    Silent,
    /// Hardware or I/O blip — trying again may work.
    Transient,
    /// User must do something (grant permission, pick another image).
    ActionRequired,
    /// Cannot be fixed on this device.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether re-entering the chooser makes sense.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

fn megabytes(bytes: u64) -> String {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    if (mb - mb.round()).abs() < 0.05 {
        format!("{}MB", mb.round() as u64)
    } else {
        format!("{mb:.1}MB")
    }
}

/// Convert a `ScanwerkError` into a `HumanError`.
pub fn humanize_error(err: &ScanwerkError) -> HumanError {
    match err {
        ScanwerkError::AcquisitionCancelled => HumanError {
            message: "Capture cancelled.".into(),
            suggestion: String::new(),
            retriable: true,
            severity: Severity::Silent,
        },

        ScanwerkError::AcquisitionFailed(detail) => humanize_acquisition(detail),

        ScanwerkError::UnsupportedType(mime) => HumanError {
            message: "File type not supported.".into(),
            suggestion: format!(
                "Choose an image in one of the accepted formats. (File type: {mime})"
            ),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::SizeExceeded { size, limit } => HumanError {
            message: format!("File size exceeds {} limit.", megabytes(*limit)),
            suggestion: format!(
                "This image is {}. Try a smaller photo or lower the camera resolution.",
                megabytes(*size)
            ),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::EncodingFailed(_) => HumanError {
            message: "Failed to process file.".into(),
            suggestion: "The image couldn't be read. It may have been moved or deleted. Try choosing it again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanwerkError::CaptureInFlight => HumanError {
            message: "Processing document...".into(),
            suggestion: "Please wait for the current capture to finish.".into(),
            retriable: false,
            severity: Severity::Transient,
        },

        ScanwerkError::InvalidTransition { .. } | ScanwerkError::SourceNotOffered(_) => {
            HumanError {
                message: "That option isn't available right now.".into(),
                suggestion: "Close the scanner and start a new scan.".into(),
                retriable: true,
                severity: Severity::ActionRequired,
            }
        }

        ScanwerkError::Config(detail) => HumanError {
            message: "The scanner settings are invalid.".into(),
            suggestion: format!("Fix or delete the configuration file and restart. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanwerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: true,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to read that file.".into(),
                    suggestion: "Check the file permissions, or copy the file somewhere else first.".into(),
                    retriable: true,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        ScanwerkError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanwerkError::Bridge(_) => HumanError {
            message: "A device-specific feature didn't work.".into(),
            suggestion: "Try restarting the app. Some features may not be available on all devices.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanwerkError::PlatformUnavailable => HumanError {
            message: "Camera Unavailable".into(),
            suggestion: "This feature isn't available on your device. Try choosing an image instead.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

/// Acquisition failures carry free-form detail from the platform.
fn humanize_acquisition(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("permission") {
        HumanError {
            message: "Permission Required".into(),
            suggestion: "Camera access is required to capture documents. Allow it in your device settings, then try again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("library") || lower.contains("gallery") {
        HumanError {
            message: "Failed to open image library".into(),
            suggestion: "Try again, or take a new photo instead.".into(),
            retriable: true,
            severity: Severity::Transient,
        }
    } else if lower.contains("camera") || lower.contains("stream") {
        HumanError {
            message: "Failed to launch camera".into(),
            suggestion: "Close any other app using the camera, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        }
    } else {
        HumanError {
            message: "Failed to capture image".into(),
            suggestion: format!("Try again or choose a different source. (Detail: {detail})"),
            retriable: true,
            severity: Severity::Transient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_silent() {
        let human = humanize_error(&ScanwerkError::AcquisitionCancelled);
        assert_eq!(human.severity, Severity::Silent);
    }

    #[test]
    fn size_message_names_the_limit() {
        let human = humanize_error(&ScanwerkError::SizeExceeded {
            size: 15 * 1024 * 1024,
            limit: 10 * 1024 * 1024,
        });
        assert!(human.message.contains("10MB"));
        assert!(human.suggestion.contains("15MB"));
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn type_message_names_the_type() {
        let human = humanize_error(&ScanwerkError::UnsupportedType("image/gif".into()));
        assert!(human.suggestion.contains("image/gif"));
        assert!(!human.suggestion.contains("JPEG"));
        assert!(human.retriable);
    }

    #[test]
    fn permission_detail_asks_for_permission() {
        let human =
            humanize_error(&ScanwerkError::AcquisitionFailed("camera permission required".into()));
        assert_eq!(human.message, "Permission Required");
    }

    #[test]
    fn odd_sizes_keep_one_decimal() {
        assert_eq!(megabytes(1_572_864), "1.5MB");
    }
}

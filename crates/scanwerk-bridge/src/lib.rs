// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Scanwerk — Native platform bridge abstractions.
//!
//! This crate defines the traits through which the capture pipeline reaches
//! the camera, the photo library, the file chooser and the permission
//! subsystem. Mobile shells provide their own `PlatformBridge`; desktop and CI
//! builds use [`desktop::DesktopBridge`].

pub mod desktop;
pub mod traits;

use std::sync::Arc;

/// Retrieves the bridge implementation for the current target.
///
/// RETURNS: a shared trait object (`dyn PlatformBridge`) that abstracts away
/// the underlying native SDK details.
pub fn platform_bridge() -> Arc<dyn traits::PlatformBridge> {
    Arc::new(desktop::DesktopBridge::new())
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: wires the capture pipeline to the desktop platform and the
// terminal.

pub mod data_dir;
pub mod pipeline;

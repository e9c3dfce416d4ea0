// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: Apache-2.0

//! Test harness for email intake abuse simulation.
//!
//! This module provides utilities for replaying submission floods against
//! the full router to validate admission controls.

pub mod attacks;
pub mod generators;
pub mod metrics;

// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Stacked image data.

pub mod stack;

pub use stack::{ImagePage, ImageStack, PageKey};

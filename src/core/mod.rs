// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout labdata.
//!
//! This module provides the foundational types for the library:
//! - [`DataError`] - Comprehensive error handling
//! - [`MetaValue`] - Tagged metadata value representation
//! - [`TypedMetadata`] - Ordered, type-hinted metadata dictionary
//! - [`Role`] / [`ColumnRoles`] - Column-role annotations ("setas")

pub mod error;
pub mod metadata;
pub mod setas;
pub mod value;

pub use error::{DataError, Result};
pub use metadata::TypedMetadata;
pub use setas::{ColumnRoles, Role, RoleColumns};
pub use value::MetaValue;

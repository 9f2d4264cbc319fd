// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Column selection.
//!
//! A [`ColumnSelector`] names one or more columns by position, header
//! text, header pattern or assigned role. Resolution is explicit about
//! its precedence so callers get the same column for the same selector
//! regardless of header contents.

use regex::Regex;

use crate::core::error::{DataError, Result};
use crate::core::setas::{ColumnRoles, Role};

/// A way of naming columns.
#[derive(Debug, Clone)]
pub enum ColumnSelector {
    /// Positional index
    Index(usize),
    /// Exact header match, falling back to substring match
    Name(String),
    /// Regular-expression match against headers
    Pattern(Regex),
    /// Every column assigned the given role
    Role(Role),
}

impl ColumnSelector {
    /// Resolve to the first matching column index.
    ///
    /// Name selectors try an exact header match before a substring
    /// match, so a header that happens to contain another header's text
    /// never shadows the exact one.
    pub fn find_column(&self, headers: &[String], roles: &ColumnRoles) -> Result<usize> {
        match self {
            ColumnSelector::Index(ix) => {
                if *ix < headers.len() {
                    Ok(*ix)
                } else {
                    Err(DataError::index_out_of_range(*ix, headers.len()))
                }
            }
            ColumnSelector::Name(name) => {
                if let Some(ix) = headers.iter().position(|h| h == name) {
                    return Ok(ix);
                }
                headers
                    .iter()
                    .position(|h| h.contains(name.as_str()))
                    .ok_or_else(|| DataError::column_not_found(name))
            }
            ColumnSelector::Pattern(re) => headers
                .iter()
                .position(|h| re.is_match(h))
                .ok_or_else(|| DataError::column_not_found(re.as_str())),
            ColumnSelector::Role(role) => roles
                .get(*role)
                .first()
                .ok_or_else(|| DataError::column_not_found(format!("role '{role}'"))),
        }
    }

    /// Resolve to every matching column index, in column order.
    pub fn find_columns(&self, headers: &[String], roles: &ColumnRoles) -> Result<Vec<usize>> {
        match self {
            ColumnSelector::Index(_) | ColumnSelector::Name(_) => {
                self.find_column(headers, roles).map(|ix| vec![ix])
            }
            ColumnSelector::Pattern(re) => {
                let found: Vec<usize> = headers
                    .iter()
                    .enumerate()
                    .filter(|(_, h)| re.is_match(h))
                    .map(|(ix, _)| ix)
                    .collect();
                if found.is_empty() {
                    Err(DataError::column_not_found(re.as_str()))
                } else {
                    Ok(found)
                }
            }
            ColumnSelector::Role(role) => {
                let found = roles.get(*role).indices();
                if found.is_empty() {
                    Err(DataError::column_not_found(format!("role '{role}'")))
                } else {
                    Ok(found)
                }
            }
        }
    }
}

impl From<usize> for ColumnSelector {
    fn from(ix: usize) -> Self {
        ColumnSelector::Index(ix)
    }
}

impl From<&str> for ColumnSelector {
    fn from(name: &str) -> Self {
        ColumnSelector::Name(name.to_string())
    }
}

impl From<String> for ColumnSelector {
    fn from(name: String) -> Self {
        ColumnSelector::Name(name)
    }
}

impl From<Regex> for ColumnSelector {
    fn from(re: Regex) -> Self {
        ColumnSelector::Pattern(re)
    }
}

impl From<Role> for ColumnSelector {
    fn from(role: Role) -> Self {
        ColumnSelector::Role(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        vec![
            "Temperature".to_string(),
            "Resistance".to_string(),
            "Resistance err".to_string(),
        ]
    }

    #[test]
    fn test_index_selector() {
        let roles = ColumnRoles::unset(3);
        let h = headers();
        assert_eq!(ColumnSelector::Index(2).find_column(&h, &roles).unwrap(), 2);
        assert!(ColumnSelector::Index(3).find_column(&h, &roles).is_err());
    }

    #[test]
    fn test_exact_name_beats_substring() {
        let roles = ColumnRoles::unset(3);
        let h = headers();
        // "Resistance" is a substring of "Resistance err" but the exact
        // header wins.
        let ix = ColumnSelector::from("Resistance").find_column(&h, &roles).unwrap();
        assert_eq!(ix, 1);
        // A pure substring still matches when no exact header exists.
        let ix = ColumnSelector::from("err").find_column(&h, &roles).unwrap();
        assert_eq!(ix, 2);
        assert!(ColumnSelector::from("Voltage").find_column(&h, &roles).is_err());
    }

    #[test]
    fn test_pattern_selector() {
        let roles = ColumnRoles::unset(3);
        let h = headers();
        let re = Regex::new("^Res").unwrap();
        assert_eq!(
            ColumnSelector::Pattern(re.clone()).find_column(&h, &roles).unwrap(),
            1
        );
        assert_eq!(
            ColumnSelector::Pattern(re).find_columns(&h, &roles).unwrap(),
            vec![1, 2]
        );
        let miss = Regex::new("^Volt").unwrap();
        assert!(ColumnSelector::Pattern(miss).find_columns(&h, &roles).is_err());
    }

    #[test]
    fn test_role_selector() {
        let mut roles = ColumnRoles::unset(3);
        roles.assign("xyy").unwrap();
        let h = headers();
        assert_eq!(
            ColumnSelector::Role(Role::X).find_column(&h, &roles).unwrap(),
            0
        );
        assert_eq!(
            ColumnSelector::Role(Role::Y).find_columns(&h, &roles).unwrap(),
            vec![1, 2]
        );
        assert!(ColumnSelector::Role(Role::Z).find_column(&h, &roles).is_err());
    }
}

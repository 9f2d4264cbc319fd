// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Column-role annotations ("setas").
//!
//! Each data column carries one [`Role`]: an axis letter (x/y/z), an error
//! bar letter (d/e/f), a direction cosine letter (u/v/w), an auxiliary
//! letter (p/q/r), unset (`.`) or ignored (`-`). The [`ColumnRoles`]
//! sequence always has exactly one entry per data column and travels with
//! its columns through structural edits.

use std::fmt;

use super::error::{DataError, Result};

/// The role a single data column plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Independent variable (at most one column)
    X,
    /// Dependent variable
    Y,
    /// Second dependent variable / surface height
    Z,
    /// Error in x
    D,
    /// Error in y
    E,
    /// Error in z
    F,
    /// x direction cosine
    U,
    /// y direction cosine
    V,
    /// z direction cosine
    W,
    /// Auxiliary p
    P,
    /// Auxiliary q
    Q,
    /// Auxiliary r
    R,
    /// No role assigned (`.`)
    Unset,
    /// Explicitly ignored (`-`)
    Ignore,
}

impl Role {
    /// Parse a role from its single-letter form.
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'x' => Ok(Role::X),
            'y' => Ok(Role::Y),
            'z' => Ok(Role::Z),
            'd' => Ok(Role::D),
            'e' => Ok(Role::E),
            'f' => Ok(Role::F),
            'u' => Ok(Role::U),
            'v' => Ok(Role::V),
            'w' => Ok(Role::W),
            'p' => Ok(Role::P),
            'q' => Ok(Role::Q),
            'r' => Ok(Role::R),
            '.' => Ok(Role::Unset),
            '-' => Ok(Role::Ignore),
            other => Err(DataError::type_mismatch(
                "a role letter in xyzdefuvwpqr.-",
                format!("'{other}'"),
            )),
        }
    }

    /// The single-letter form of this role.
    pub fn as_char(self) -> char {
        match self {
            Role::X => 'x',
            Role::Y => 'y',
            Role::Z => 'z',
            Role::D => 'd',
            Role::E => 'e',
            Role::F => 'f',
            Role::U => 'u',
            Role::V => 'v',
            Role::W => 'w',
            Role::P => 'p',
            Role::Q => 'q',
            Role::R => 'r',
            Role::Unset => '.',
            Role::Ignore => '-',
        }
    }

    /// True for roles that may only be held by one column at a time.
    pub fn is_singleton(self) -> bool {
        matches!(self, Role::X)
    }

    /// True when this role marks a column as carrying data of interest.
    pub fn is_assigned(self) -> bool {
        !matches!(self, Role::Unset | Role::Ignore)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Result of looking up which column(s) hold a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleColumns {
    /// No column carries the role
    Unset,
    /// Exactly one column (singleton roles)
    Single(usize),
    /// One or more columns, in column order
    Many(Vec<usize>),
}

impl RoleColumns {
    /// The first column index, if any column carries the role.
    pub fn first(&self) -> Option<usize> {
        match self {
            RoleColumns::Unset => None,
            RoleColumns::Single(ix) => Some(*ix),
            RoleColumns::Many(ixs) => ixs.first().copied(),
        }
    }

    /// All column indices carrying the role.
    pub fn indices(&self) -> Vec<usize> {
        match self {
            RoleColumns::Unset => Vec::new(),
            RoleColumns::Single(ix) => vec![*ix],
            RoleColumns::Many(ixs) => ixs.clone(),
        }
    }
}

/// One role per data column, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnRoles {
    roles: Vec<Role>,
}

impl ColumnRoles {
    /// Create an all-unset role map for `columns` columns.
    pub fn unset(columns: usize) -> Self {
        Self {
            roles: vec![Role::Unset; columns],
        }
    }

    /// Parse a role string such as `"xy."` against the current column count.
    ///
    /// Strings shorter than the column count are padded with `.`; longer
    /// strings and more than one `x` fail with `TypeMismatch`, leaving the
    /// map untouched.
    pub fn assign(&mut self, spec: &str) -> Result<()> {
        if spec.chars().count() > self.roles.len() {
            return Err(DataError::type_mismatch(
                format!("at most {} role letters", self.roles.len()),
                format!("{} role letters", spec.chars().count()),
            ));
        }
        let mut parsed = Vec::with_capacity(self.roles.len());
        for c in spec.chars() {
            parsed.push(Role::from_char(c)?);
        }
        parsed.resize(self.roles.len(), Role::Unset);
        if parsed.iter().filter(|r| **r == Role::X).count() > 1 {
            return Err(DataError::type_mismatch(
                "at most one x column",
                "multiple x assignments",
            ));
        }
        self.roles = parsed;
        Ok(())
    }

    /// Number of columns tracked.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// True when no columns are tracked.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// The role of a single column.
    pub fn role_of(&self, column: usize) -> Result<Role> {
        self.roles
            .get(column)
            .copied()
            .ok_or_else(|| DataError::index_out_of_range(column, self.roles.len()))
    }

    /// The column(s) carrying a role.
    ///
    /// Singleton roles yield `Single`, multi-valued roles `Many`; a role
    /// held by no column yields `Unset` rather than an index.
    pub fn get(&self, role: Role) -> RoleColumns {
        let matches: Vec<usize> = self
            .roles
            .iter()
            .enumerate()
            .filter(|(_, r)| **r == role)
            .map(|(ix, _)| ix)
            .collect();
        if matches.is_empty() {
            RoleColumns::Unset
        } else if role.is_singleton() {
            RoleColumns::Single(matches[0])
        } else {
            RoleColumns::Many(matches)
        }
    }

    /// Mark the given columns with a role.
    ///
    /// Setting a singleton role clears its previous holder first.
    pub fn set_role(&mut self, role: Role, columns: &[usize]) -> Result<()> {
        for &ix in columns {
            if ix >= self.roles.len() {
                return Err(DataError::index_out_of_range(ix, self.roles.len()));
            }
        }
        if role.is_singleton() {
            if columns.len() > 1 {
                return Err(DataError::type_mismatch(
                    "a single column for role x",
                    format!("{} columns", columns.len()),
                ));
            }
            for r in self.roles.iter_mut() {
                if *r == role {
                    *r = Role::Unset;
                }
            }
        }
        for &ix in columns {
            self.roles[ix] = role;
        }
        Ok(())
    }

    /// Explicit role-to-column lookup (first holder).
    pub fn column_for_role(&self, role: Role) -> Option<usize> {
        self.get(role).first()
    }

    /// Index of the x column, if assigned.
    pub fn xcol(&self) -> Option<usize> {
        self.column_for_role(Role::X)
    }

    /// Indices of the y columns.
    pub fn ycol(&self) -> Vec<usize> {
        self.get(Role::Y).indices()
    }

    /// Indices of the z columns.
    pub fn zcol(&self) -> Vec<usize> {
        self.get(Role::Z).indices()
    }

    /// Indices of the x-error columns.
    pub fn xerr(&self) -> Vec<usize> {
        self.get(Role::D).indices()
    }

    /// Indices of the y-error columns.
    pub fn yerr(&self) -> Vec<usize> {
        self.get(Role::E).indices()
    }

    /// Indices of the z-error columns.
    pub fn zerr(&self) -> Vec<usize> {
        self.get(Role::F).indices()
    }

    /// Indices of the u (x direction cosine) columns.
    pub fn ucol(&self) -> Vec<usize> {
        self.get(Role::U).indices()
    }

    /// Indices of the v (y direction cosine) columns.
    pub fn vcol(&self) -> Vec<usize> {
        self.get(Role::V).indices()
    }

    /// Indices of the w (z direction cosine) columns.
    pub fn wcol(&self) -> Vec<usize> {
        self.get(Role::W).indices()
    }

    /// Number of distinct geometric axes in use (x, y, z roles present).
    pub fn dims(&self) -> usize {
        [Role::X, Role::Y, Role::Z]
            .iter()
            .filter(|r| self.get(**r) != RoleColumns::Unset)
            .count()
    }

    /// Insert a role when a column is inserted at `index`.
    pub fn insert(&mut self, index: usize, role: Role) {
        let index = index.min(self.roles.len());
        self.roles.insert(index, role);
    }

    /// Remove the role of a deleted column.
    pub fn remove(&mut self, index: usize) -> Result<Role> {
        if index >= self.roles.len() {
            return Err(DataError::index_out_of_range(index, self.roles.len()));
        }
        Ok(self.roles.remove(index))
    }

    /// Rebuild the sequence from a column ordering.
    pub fn reorder(&mut self, order: &[usize]) -> Result<()> {
        let mut reordered = Vec::with_capacity(order.len());
        for &ix in order {
            if ix >= self.roles.len() {
                return Err(DataError::index_out_of_range(ix, self.roles.len()));
            }
            reordered.push(self.roles[ix]);
        }
        self.roles = reordered;
        Ok(())
    }

    /// Swap the roles of two columns.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        let len = self.roles.len();
        if a >= len {
            return Err(DataError::index_out_of_range(a, len));
        }
        if b >= len {
            return Err(DataError::index_out_of_range(b, len));
        }
        self.roles.swap(a, b);
        Ok(())
    }

    /// Iterate over the roles in column order.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.roles.iter().copied()
    }
}

impl fmt::Display for ColumnRoles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for role in &self.roles {
            write!(f, "{}", role.as_char())?;
        }
        Ok(())
    }
}

//! Error types for the cell registry.
//!
//! Every failure carries the offending name, cell number or expression so a
//! build driver can report it verbatim. [`RegistryError::kind`] folds the
//! variants into the coarse [`ErrorKind`] taxonomy used by callers that only
//! care about the category.

use crate::CellId;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Coarse classification of a [`RegistryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A region, object, sub-group or cell owner does not exist.
    NameNotFound,
    /// A region, object or active cell is already registered.
    DuplicateName,
    /// A reservation size is zero or the cell space is exhausted.
    SizeError,
    /// An ordinal index is out of bounds.
    IndexError,
    /// A query expression is malformed.
    ParseError,
    /// A cell targeted by a move is not in the set.
    NotPresent,
}

/// Errors produced by the registry, the zone allocator and the query resolver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No region is registered under the name.
    #[error("region '{name}' not found")]
    RegionNotFound { name: String },

    /// The region exists but has no attached component.
    #[error("region '{name}' has no attached component")]
    ComponentNotFound { name: String },

    /// No region name starts with the prefix.
    #[error("no region matches prefix '{prefix}'")]
    PrefixNotFound { prefix: String },

    /// The cell is not committed to any region.
    #[error("cell {cell} is not active")]
    CellNotActive { cell: CellId },

    /// No zone or region claims the cell number.
    #[error("cell {cell} has no owning region")]
    NoOwner { cell: CellId },

    /// A query expression matched none of the grammar forms.
    #[error("unable to resolve '{expr}'")]
    Unresolved { expr: String },

    /// A region is already reserved under the name.
    #[error("region '{name}' already exists")]
    DuplicateRegion { name: String },

    /// A component is already attached to the region.
    #[error("region '{name}' already has a component attached")]
    DuplicateComponent { name: String },

    /// The cell is already committed.
    #[error("cell {cell} is already active in region '{owner}'")]
    CellAlreadyActive { cell: CellId, owner: String },

    /// A zero-size reservation.
    #[error("region '{name}' requested zero capacity")]
    ZeroSize { name: String },

    /// The counter would overflow the cell number space.
    #[error("reserving {size} cells for '{name}' exhausts the cell number space")]
    CapacityExhausted { name: String, size: usize },

    /// An ordinal index past the end of a region or cell group.
    #[error("index {index} out of range for '{context}' ({len} cells)")]
    IndexOutOfRange {
        context: String,
        index: usize,
        len: usize,
    },

    /// Syntax error in a query expression.
    #[error("malformed expression '{expr}': {message}")]
    Parse { expr: String, message: String },

    /// The cell is not a member of the interval set.
    #[error("cell {cell} is not present")]
    NotPresent { cell: CellId },
}

impl RegistryError {
    /// Create a region-not-found error.
    pub fn region_not_found(name: impl Into<String>) -> Self {
        Self::RegionNotFound { name: name.into() }
    }

    /// Create an unresolved-expression error.
    pub fn unresolved(expr: impl Into<String>) -> Self {
        Self::Unresolved { expr: expr.into() }
    }

    /// Create a parse error.
    pub fn parse(expr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            expr: expr.into(),
            message: message.into(),
        }
    }

    /// Create an index error.
    pub fn index_out_of_range(context: impl Into<String>, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            context: context.into(),
            index,
            len,
        }
    }

    /// The taxonomy category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RegionNotFound { .. }
            | Self::ComponentNotFound { .. }
            | Self::PrefixNotFound { .. }
            | Self::CellNotActive { .. }
            | Self::NoOwner { .. }
            | Self::Unresolved { .. } => ErrorKind::NameNotFound,
            Self::DuplicateRegion { .. }
            | Self::DuplicateComponent { .. }
            | Self::CellAlreadyActive { .. } => ErrorKind::DuplicateName,
            Self::ZeroSize { .. } | Self::CapacityExhausted { .. } => ErrorKind::SizeError,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexError,
            Self::Parse { .. } => ErrorKind::ParseError,
            Self::NotPresent { .. } => ErrorKind::NotPresent,
        }
    }
}

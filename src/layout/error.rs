//! Error types for the layout engine

use thiserror::Error;

use super::types::Point;

/// Errors that can occur while resolving a command.
///
/// Every variant carries the index of the offending command in the build.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// Terminal not defined for the referenced element's kind
    #[error("command {index}: element '{element}' has no terminal '{terminal}' (valid terminals: {valid})")]
    UnresolvedAnchor {
        index: usize,
        element: String,
        terminal: String,
        valid: String,
    },

    /// Reference to a name or log position that was never placed
    #[error("command {index}: undefined element '{name}'")]
    UndefinedElement {
        index: usize,
        name: String,
        suggestions: Vec<String>,
    },

    /// Chain or `last` reference before anything was placed
    #[error("command {index}: nothing to chain from, no element has been placed yet")]
    DanglingChain { index: usize },

    #[error("command {index}: invalid length {length} (must be finite and non-negative)")]
    InvalidLength { index: usize, length: f64 },

    #[error("command {index}: invalid unit {unit} (must be finite and positive)")]
    InvalidUnit { index: usize, unit: f64 },

    /// `pop` without a matching `push`
    #[error("command {index}: pop without a matching push")]
    EmptyStateStack { index: usize },

    /// A point expression produced an infinite or NaN coordinate
    #[error("command {index}: point {point} is not finite")]
    NonFinitePoint { index: usize, point: Point },
}

impl LayoutError {
    /// Create an unresolved anchor error listing the terminals that do exist
    pub fn unresolved(
        index: usize,
        element: impl Into<String>,
        terminal: impl Into<String>,
        valid: &[&str],
    ) -> Self {
        Self::UnresolvedAnchor {
            index,
            element: element.into(),
            terminal: terminal.into(),
            valid: valid.join(", "),
        }
    }

    /// Create an undefined element error with suggestions
    pub fn undefined(index: usize, name: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self::UndefinedElement {
            index,
            name: name.into(),
            suggestions,
        }
    }

    /// Index of the command that failed
    pub fn index(&self) -> usize {
        match self {
            Self::UnresolvedAnchor { index, .. }
            | Self::UndefinedElement { index, .. }
            | Self::DanglingChain { index }
            | Self::InvalidLength { index, .. }
            | Self::InvalidUnit { index, .. }
            | Self::EmptyStateStack { index }
            | Self::NonFinitePoint { index, .. } => *index,
        }
    }

    /// Get suggestions if available
    pub fn suggestions(&self) -> Option<&[String]> {
        match self {
            Self::UndefinedElement { suggestions, .. } if !suggestions.is_empty() => {
                Some(suggestions)
            }
            _ => None,
        }
    }
}

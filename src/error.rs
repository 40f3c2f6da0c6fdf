//! Error types for the portfolio document engine.

use std::fmt;

use thiserror::Error;

/// Result type alias for portfolio operations.
pub type FolioResult<T> = Result<T, FolioError>;

/// Why a requested `parent_id` was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidParentReason {
    /// No component with that id exists.
    Missing,
    /// The parent lives on another page.
    CrossPage {
        parent_page: String,
        child_page: String,
    },
    /// A component cannot contain itself.
    SelfParent,
    /// The parent is already a descendant of the component.
    Cycle,
}

impl fmt::Display for InvalidParentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "parent does not exist"),
            Self::CrossPage {
                parent_page,
                child_page,
            } => write!(
                f,
                "parent is on page '{}' but child is on page '{}'",
                parent_page, child_page
            ),
            Self::SelfParent => write!(f, "component cannot be its own parent"),
            Self::Cycle => write!(f, "parent is a descendant of the component"),
        }
    }
}

/// Errors that can occur during portfolio operations.
#[derive(Error, Debug)]
pub enum FolioError {
    /// Automerge error during document operations.
    #[error("Automerge error: {0}")]
    Automerge(#[from] automerge::AutomergeError),

    /// Autosurgeon hydration error.
    #[error("Hydration error: {0}")]
    Hydrate(#[from] autosurgeon::HydrateError),

    /// Autosurgeon reconcile error.
    #[error("Reconcile error: {0}")]
    Reconcile(#[from] autosurgeon::ReconcileError),

    /// Node not found in the document.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Field not found in a node.
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// A parent reference would break the page-scoped forest.
    #[error("Invalid parent '{parent_id}' for component '{id}': {reason}")]
    InvalidParent {
        id: String,
        parent_id: String,
        reason: InvalidParentReason,
    },

    /// Schema violation - document structure is invalid.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A change hash string from a peer did not parse.
    #[error("Invalid change hash: {0}")]
    InvalidHash(String),

    /// Chat transport failure reported by the push-messaging collaborator.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Imported file could not be turned into a component.
    #[error("Import error: {0}")]
    Import(String),
}

impl FolioError {
    /// Creates a NodeNotFound error.
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound(id.into())
    }

    /// Creates a FieldNotFound error.
    pub fn field_not_found(field: impl Into<String>) -> Self {
        Self::FieldNotFound(field.into())
    }

    /// Creates an InvalidParent error.
    pub fn invalid_parent(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        reason: InvalidParentReason,
    ) -> Self {
        Self::InvalidParent {
            id: id.into(),
            parent_id: parent_id.into(),
            reason,
        }
    }

    /// Creates a SchemaViolation error.
    pub fn schema_violation(msg: impl Into<String>) -> Self {
        Self::SchemaViolation(msg.into())
    }

    /// Creates a Transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates an Import error.
    pub fn import(msg: impl Into<String>) -> Self {
        Self::Import(msg.into())
    }

    /// True for the structural validation failure raised by reparenting.
    pub fn is_invalid_parent(&self) -> bool {
        matches!(self, Self::InvalidParent { .. })
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

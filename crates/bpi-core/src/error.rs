use std::fmt;

/// Errors produced by graph construction, index computation and ranking.
///
/// Every variant is terminal for the requested computation: a run either
/// completes and returns all scores, or returns one of these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndexError {
    /// The graph description is structurally invalid.
    #[error("malformed graph: {0}")]
    MalformedGraph(String),

    /// `order` or `iterations` is below 1.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A vertex has no entry in the label table.
    #[error("no label for vertex '{0}'")]
    UnknownVertexLabel(String),

    /// An explicit baseline does not cover exactly the graph's vertices.
    #[error("baseline does not match graph: {0}")]
    BaselineMismatch(String),

    /// Damping constant is negative or not finite.
    #[error("damping must be a finite non-negative number, got {0}")]
    InvalidDamping(f64),

    /// A worker pool of zero threads was requested.
    #[error("thread count must be at least 1")]
    InvalidThreadCount,

    /// The run was cancelled between two evaluation rounds.
    #[error("computation cancelled after {completed} of {total} rounds")]
    Cancelled { completed: usize, total: usize },

    /// The rayon worker pool could not be built.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

impl IndexError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedGraph(_) => ErrorCode::MalformedGraph,
            Self::InvalidConfiguration(_) => ErrorCode::InvalidConfiguration,
            Self::UnknownVertexLabel(_) => ErrorCode::UnknownVertexLabel,
            Self::BaselineMismatch(_) => ErrorCode::BaselineMismatch,
            Self::InvalidDamping(_) => ErrorCode::InvalidDamping,
            Self::InvalidThreadCount => ErrorCode::InvalidThreadCount,
            Self::Cancelled { .. } => ErrorCode::Cancelled,
            Self::ThreadPool(_) => ErrorCode::InternalUnexpected,
        }
    }
}

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    MalformedGraph,
    BaselineMismatch,
    InvalidDamping,
    InvalidConfiguration,
    InvalidThreadCount,
    UnknownVertexLabel,
    Cancelled,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MalformedGraph => "E1001",
            Self::BaselineMismatch => "E1002",
            Self::InvalidDamping => "E1003",
            Self::InvalidConfiguration => "E2001",
            Self::InvalidThreadCount => "E2002",
            Self::UnknownVertexLabel => "E3001",
            Self::Cancelled => "E4001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MalformedGraph => "Malformed graph",
            Self::BaselineMismatch => "Baseline does not match graph",
            Self::InvalidDamping => "Invalid damping constant",
            Self::InvalidConfiguration => "Invalid index configuration",
            Self::InvalidThreadCount => "Invalid thread count",
            Self::UnknownVertexLabel => "Vertex has no label",
            Self::Cancelled => "Computation cancelled",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::MalformedGraph => {
                Some("Check that every edge endpoint is declared and weights are >= 0.")
            }
            Self::BaselineMismatch => Some("Provide one quota per graph vertex, no extras."),
            Self::InvalidDamping => Some("Use a damping constant such as 0.45."),
            Self::InvalidConfiguration => Some("Both order and iterations must be at least 1."),
            Self::InvalidThreadCount => Some("Omit --threads or pass a positive number."),
            Self::UnknownVertexLabel => {
                Some("Extend the label table or pass --raw-ids to show identifiers.")
            }
            Self::Cancelled => None,
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

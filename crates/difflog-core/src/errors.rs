use difflog_core_types::RequestId;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable string code (for logs and tests) and a stable
/// integer status (for the C boundary, where 0 always means success).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    /// Caller supplied a null, empty or non-UTF-8 argument
    InvalidInput,
    /// The SQL execution engine reported a failure
    QueryFailed,
    /// Snapshot load/store failed or a stored snapshot is corrupt
    Persistence,
    /// A record or row set could not be encoded or decoded
    Serialization,
    /// A query was issued before initialize or after shutdown
    NotInitialized,
    Io,
    /// Configuration file or override could not be parsed or validated
    InvalidConfig,
    /// A per-name exclusive section could not be acquired
    Concurrency,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::QueryFailed => "ERR_QUERY_FAILED",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::NotInitialized => "ERR_NOT_INITIALIZED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Get the stable integer status for this kind. Never zero.
    pub fn status(&self) -> i32 {
        match self {
            ExErrorKind::InvalidInput => 1,
            ExErrorKind::QueryFailed => 2,
            ExErrorKind::Persistence => 3,
            ExErrorKind::Serialization => 4,
            ExErrorKind::NotInitialized => 5,
            ExErrorKind::Io => 6,
            ExErrorKind::InvalidConfig => 7,
            ExErrorKind::Concurrency => 8,
            ExErrorKind::Internal => 9,
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus context for
/// debugging. Built with the `with_*` methods:
///
/// ```
/// use difflog_core::errors::{ExError, ExErrorKind};
///
/// let err = ExError::new(ExErrorKind::Persistence)
///     .with_op("load")
///     .with_query_name("procs")
///     .with_message("database is locked");
/// assert_eq!(err.code(), "ERR_PERSISTENCE");
/// assert_eq!(err.status(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    query_name: Option<String>,
    request_id: Option<RequestId>,
    engine_status: Option<i32>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            query_name: None,
            request_id: None,
            engine_status: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add query name context
    pub fn with_query_name(mut self, name: impl Into<String>) -> Self {
        self.query_name = Some(name.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Attach the status reported by an external engine.
    ///
    /// A zero status is ignored so that an error can never report success.
    pub fn with_engine_status(mut self, status: i32) -> Self {
        if status != 0 {
            self.engine_status = Some(status);
        }
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Integer status for the caller: the engine's own status when one was
    /// attached, otherwise the kind's stable status.
    pub fn status(&self) -> i32 {
        self.engine_status.unwrap_or_else(|| self.kind.status())
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the query name context, if any
    pub fn query_name(&self) -> Option<&str> {
        self.query_name.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the engine-reported status, if any
    pub fn engine_status(&self) -> Option<i32> {
        self.engine_status
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(name) = &self.query_name {
            write!(f, " (query: {})", name)?;
        }
        if let Some(status) = self.engine_status {
            write!(f, " (engine status: {})", status)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Conversion from serde_json::Error to ExError
impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Serialization).with_message(err.to_string())
    }
}

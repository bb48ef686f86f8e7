//! Closed error taxonomy shared by every stage of the pipeline.

use std::collections::BTreeMap;
use std::fmt;

use chrono::DateTime;
use chrono::Utc;

/// The closed set of error kinds a stage may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Provider,
    Execution,
    Configuration,
    Network,
    Permission,
    Plugin,
    Context,
    Update,
    Safety,
    Timeout,
    Authentication,
    Internal,
}

impl ErrorKind {
    /// Default retryability, absent a policy override: transient and
    /// provider-side failures are retryable, everything else is not.
    pub fn default_retryable(self) -> bool {
        matches!(self, ErrorKind::Network | ErrorKind::Timeout | ErrorKind::Provider)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

/// A structured application error. Carries enough context to be logged
/// verbosely without ever including secret material.
#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: String,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    pub context: BTreeMap<String, String>,
    pub component: &'static str,
    pub operation: &'static str,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

impl AppError {
    pub fn new(kind: ErrorKind, component: &'static str, operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            message: message.into(),
            cause: None,
            context: BTreeMap::new(),
            component,
            operation,
            timestamp: Utc::now(),
            user_id: None,
            session_id: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Rewrap a lower-level error with an added kind when that kind adds
    /// diagnostic value; otherwise callers should just attach context via
    /// `with_context` instead of calling this.
    pub fn wrap(kind: ErrorKind, component: &'static str, operation: &'static str, inner: AppError) -> Self {
        let message = format!("{operation} failed: {inner}");
        Self::new(kind, component, operation, message).with_cause(inner)
    }

    pub fn is_retryable(&self, retryable: &std::collections::HashSet<ErrorKind>, non_retryable: &std::collections::HashSet<ErrorKind>) -> bool {
        if non_retryable.contains(&self.kind) {
            return false;
        }
        if retryable.contains(&self.kind) {
            return true;
        }
        self.kind.default_retryable()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.component, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|c| c.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type AppResult<T> = Result<T, AppError>;

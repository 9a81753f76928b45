//! Structured error types shared across the cfl crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`CflError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (output names, paths, field names).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the operator fix the invocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

/// Canonical error type for the experiment driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum CflError {
    /// Invalid invocation or settings, including unrecognized experiment kinds.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// The experiment could not be constructed from its record.
    #[error("build error: {0}")]
    Build(ErrorInfo),
    /// Result store access failures.
    #[error("store error: {0}")]
    Store(ErrorInfo),
    /// Failures raised by an execution handler.
    #[error("handler error: {0}")]
    Handler(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl CflError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            CflError::Config(info)
            | CflError::Build(info)
            | CflError::Store(info)
            | CflError::Handler(info)
            | CflError::Serde(info) => info,
        }
    }

    /// Shorthand for a build failure carrying only a code and message.
    pub fn build(code: &str, message: impl ToString) -> Self {
        CflError::Build(ErrorInfo::new(code, message.to_string()))
    }

    /// Shorthand for a store failure carrying only a code and message.
    pub fn store(code: &str, message: impl ToString) -> Self {
        CflError::Store(ErrorInfo::new(code, message.to_string()))
    }
}

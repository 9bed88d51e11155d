//! Error types for chainrule.
//!
//! All errors are strongly typed using thiserror so callers can match on the
//! exact failure instead of parsing messages.

use thiserror::Error;

use crate::value::Kind;

/// Errors raised by the fact store and the path resolver.
#[derive(Debug, Error)]
pub enum FactError {
    #[error("Fact '{name}' must be a mutable object handle, got {kind}")]
    InvalidFactKind {
        name: String,
        kind: Kind,
    },

    #[error("Fact '{name}' not found")]
    FactNotFound {
        name: String,
    },

    #[error("Fact '{name}' is retracted")]
    FactRetracted {
        name: String,
    },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath {
        path: String,
        reason: String,
    },

    #[error("No attribute path specified after '{fact}'")]
    NoPathSpecified {
        fact: String,
    },

    #[error("Attribute '{attribute}' not found on {type_name}")]
    AttributeNotFound {
        type_name: String,
        attribute: String,
    },

    #[error("Cannot assign {actual} to {type_name}.{attribute} (expects {expected})")]
    TypeMismatch {
        type_name: String,
        attribute: String,
        expected: String,
        actual: Kind,
    },

    #[error("Method {method}() not found on {type_name}")]
    MethodNotFound {
        type_name: String,
        method: String,
    },

    #[error("Invalid argument count for {method}(): need {expected}, got {actual}")]
    ArgumentCountMismatch {
        method: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid argument type for {method}() argument #{index}: require {expected} but got {actual}")]
    ArgumentTypeMismatch {
        method: String,
        index: usize,
        expected: Kind,
        actual: Kind,
    },

    #[error("Method {method}() returned {count} values, at most one is supported")]
    UnsupportedMultiReturn {
        method: String,
        count: usize,
    },

    #[error("Method {method}() failed: {reason}")]
    MethodFailed {
        method: String,
        reason: String,
    },

    #[error("Fact object is already borrowed by a running method")]
    FactInUse,
}

impl FactError {
    /// Creates a method failure, for use inside `Fact::call` implementations.
    #[must_use]
    pub fn method_failed(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MethodFailed {
            method: method.into(),
            reason: reason.into(),
        }
    }
}

/// Validation errors for rules, knowledge bases and configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid rule name '{name}': must be an identifier")]
    InvalidRuleName {
        name: String,
    },

    #[error("Rule '{name}' is already registered in knowledge base '{knowledge_base}'")]
    DuplicateRule {
        knowledge_base: String,
        name: String,
    },

    #[error("Rule '{name}' has no actions")]
    MissingActions {
        name: String,
    },

    #[error("Required field '{field}' is missing")]
    MissingField {
        field: String,
    },

    #[error("max_cycle must be at least 1, got {value}")]
    InvalidMaxCycle {
        value: u64,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },
}

/// Errors that stop an execution of the rule cycle.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Maximum cycle of {max_cycle} reached: rules kept matching without converging")]
    CycleExceeded {
        max_cycle: u64,
    },

    #[error("Rule '{rule}' failed in pass {pass}: {source}")]
    RuleFailed {
        rule: String,
        pass: u64,
        #[source]
        source: Box<EngineError>,
    },
}

/// Top-level error type for chainrule.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Fact error: {0}")]
    Fact(#[from] FactError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("{message}")]
    Action {
        message: String,
    },
}

impl EngineError {
    /// Creates an error raised from inside a rule condition or action.
    #[must_use]
    pub fn action(message: impl Into<String>) -> Self {
        Self::Action {
            message: message.into(),
        }
    }

    /// Returns true if this is a fact store or path resolution error.
    #[must_use]
    pub const fn is_fact(&self) -> bool {
        matches!(self, Self::Fact(_))
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if execution stopped only because the pass budget ran out.
    #[must_use]
    pub const fn is_cycle_exceeded(&self) -> bool {
        matches!(
            self,
            Self::Execution(ExecutionError::CycleExceeded { .. })
        )
    }

    /// Returns the underlying fact error, unwrapping rule failures.
    #[must_use]
    pub fn as_fact_error(&self) -> Option<&FactError> {
        match self {
            Self::Fact(e) => Some(e),
            Self::Execution(ExecutionError::RuleFailed { source, .. }) => source.as_fact_error(),
            _ => None,
        }
    }
}

/// Result type alias for chainrule operations.
pub type EngineResult<T> = Result<T, EngineError>;

//! Template error types

use std::fmt;

/// Errors raised while compiling or rendering a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Malformed template syntax (compile phase)
    MalformedSyntax {
        /// Error message
        message: String,
        /// Line number where the error occurred
        line: usize,
    },

    /// Template calls a helper that is not in the helper set (compile phase)
    UnknownHelper {
        /// Name used in the template
        name: String,
        /// Line number where the error occurred
        line: usize,
    },

    /// Key not found in data context
    UndefinedKey {
        /// The key that was not found
        key: String,
        /// Line number where the error occurred
        line: usize,
    },

    /// Helper called with the wrong number of arguments
    HelperArity {
        /// Helper name
        name: String,
        /// Number of arguments the helper takes
        expected: usize,
        /// Number of arguments supplied
        found: usize,
        /// Line number where the error occurred
        line: usize,
    },

    /// Helper argument has the wrong type or is out of range
    HelperArgument {
        /// Helper name
        name: String,
        /// What was wrong with the argument
        message: String,
        /// Line number where the error occurred
        line: usize,
    },

    /// Sequence used in a placeholder instead of an {{each}} loop
    SequenceInPlaceholder {
        /// The expression that produced a sequence
        expr: String,
        /// Line number where the error occurred
        line: usize,
    },

    /// Table used in placeholder (must use nested keys)
    TableInPlaceholder {
        /// The expression that resolved to a table
        expr: String,
        /// Line number where the error occurred
        line: usize,
    },

    /// {{each}} source did not evaluate to a sequence
    NotASequence {
        /// The loop source expression
        expr: String,
        /// Line number where the error occurred
        line: usize,
    },
}

impl TemplateError {
    /// Line number the error points at
    pub fn line(&self) -> usize {
        match self {
            TemplateError::MalformedSyntax { line, .. }
            | TemplateError::UnknownHelper { line, .. }
            | TemplateError::UndefinedKey { line, .. }
            | TemplateError::HelperArity { line, .. }
            | TemplateError::HelperArgument { line, .. }
            | TemplateError::SequenceInPlaceholder { line, .. }
            | TemplateError::TableInPlaceholder { line, .. }
            | TemplateError::NotASequence { line, .. } => *line,
        }
    }
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::MalformedSyntax { message, line } => {
                write!(f, "Malformed syntax at line {}: {}", line, message)
            }
            TemplateError::UnknownHelper { name, line } => {
                write!(f, "Unknown helper '{}' at line {}", name, line)
            }
            TemplateError::UndefinedKey { key, line } => {
                write!(f, "Undefined key '{}' at line {}", key, line)
            }
            TemplateError::HelperArity {
                name,
                expected,
                found,
                line,
            } => {
                write!(
                    f,
                    "Helper '{}' takes {} argument(s) but {} were given at line {}",
                    name, expected, found, line
                )
            }
            TemplateError::HelperArgument {
                name,
                message,
                line,
            } => {
                write!(
                    f,
                    "Invalid argument for helper '{}' at line {}: {}",
                    name, line, message
                )
            }
            TemplateError::SequenceInPlaceholder { expr, line } => {
                write!(
                    f,
                    "Sequence '{}' used outside of {{{{each}}}} context at line {}. Use {{{{each {} |item|}}}} ... {{{{/each}}}}",
                    expr, line, expr
                )
            }
            TemplateError::TableInPlaceholder { expr, line } => {
                write!(
                    f,
                    "Table '{}' cannot be used directly in placeholder at line {}. Use nested keys like {}.field",
                    expr, line, expr
                )
            }
            TemplateError::NotASequence { expr, line } => {
                write!(
                    f,
                    "{{{{each}}}} source '{}' is not a sequence at line {}",
                    expr, line
                )
            }
        }
    }
}

impl std::error::Error for TemplateError {}

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// Numeric diagnostic codes.
pub mod diagnostic_codes {
    /// A type name could not be bound to any declaration.
    pub const UNRESOLVED_REFERENCE: u32 = 1001;
    /// A type name is bound by several equally ranked declarations.
    pub const AMBIGUOUS_REFERENCE: u32 = 1002;
    /// Two explicit imports bind the same name to different declarations.
    pub const IMPORT_CONFLICT: u32 = 1003;
    /// A type alias expands back into itself.
    pub const RECURSIVE_TYPE_ALIAS: u32 = 1004;
    /// A type parameter was given type arguments.
    pub const TYPE_PARAMETER_WITH_ARGUMENTS: u32 = 1005;
    /// Array type needed for a vararg parameter is not declared.
    pub const MISSING_ARRAY_TYPE: u32 = 1006;
}

/// Message templates, indexed by code. `{0}`, `{1}` are substituted by
/// [`format_message`].
pub mod diagnostic_messages {
    use super::{DiagnosticCategory, DiagnosticMessage, diagnostic_codes};

    pub const UNRESOLVED_REFERENCE: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::UNRESOLVED_REFERENCE,
        category: DiagnosticCategory::Error,
        message: "Unresolved reference: {0}",
    };

    pub const AMBIGUOUS_REFERENCE: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::AMBIGUOUS_REFERENCE,
        category: DiagnosticCategory::Error,
        message: "Reference '{0}' is ambiguous: it matches {1}",
    };

    pub const IMPORT_CONFLICT: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::IMPORT_CONFLICT,
        category: DiagnosticCategory::Error,
        message: "Conflicting imports for '{0}': {1}",
    };

    pub const RECURSIVE_TYPE_ALIAS: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::RECURSIVE_TYPE_ALIAS,
        category: DiagnosticCategory::Error,
        message: "Recursive type alias in expansion of '{0}': {1}",
    };

    pub const TYPE_PARAMETER_WITH_ARGUMENTS: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::TYPE_PARAMETER_WITH_ARGUMENTS,
        category: DiagnosticCategory::Error,
        message: "Type parameter '{0}' cannot have type arguments",
    };

    pub const MISSING_ARRAY_TYPE: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::MISSING_ARRAY_TYPE,
        category: DiagnosticCategory::Error,
        message: "Cannot build vararg array type: '{0}' is not declared",
    };

    pub const ALL: &[DiagnosticMessage] = &[
        UNRESOLVED_REFERENCE,
        AMBIGUOUS_REFERENCE,
        IMPORT_CONFLICT,
        RECURSIVE_TYPE_ALIAS,
        TYPE_PARAMETER_WITH_ARGUMENTS,
        MISSING_ARRAY_TYPE,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
}

impl Diagnostic {
    pub fn error(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            message_text: message.into(),
            code,
            file: file.into(),
            start,
            length,
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;

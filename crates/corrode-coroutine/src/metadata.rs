//! Decoding of continuation debug metadata.
//!
//! The compiler attaches to each continuation class the source position of
//! every suspension point and the mapping from spilled fields back to the
//! local variables they hold. The continuation's `label` field (stored off
//! by one) says which suspension point it is parked at.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawDebugMetadata {
    pub source_file: String,
    /// Fully-qualified name of the class the suspend code was written in.
    pub class_name: String,
    pub method_name: String,
    /// Source line per suspension label.
    pub line_numbers: Vec<i32>,
    /// Names of the continuation fields holding spilled locals.
    pub spilled: Vec<String>,
    /// Source names of the spilled locals, parallel to `spilled`.
    pub local_names: Vec<String>,
    /// Label at which each spilled entry is live, parallel to `spilled`.
    pub index_to_label: Vec<i32>,
}

/// Where a continuation resumes, in source terms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTraceElement {
    pub class_name: String,
    pub method_name: String,
    pub source_file: String,
    pub line: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldVariable {
    pub field_name: String,
    pub variable_name: String,
}

impl RawDebugMetadata {
    /// Suspension label from the raw value of the `label` field.
    pub fn label_from_field(raw: i64) -> i32 {
        i32::try_from(raw.saturating_sub(1)).unwrap_or(-1)
    }

    /// -1 when the continuation has not suspended yet or the label is out
    /// of range.
    pub fn line_number(&self, label: i32) -> i32 {
        usize::try_from(label)
            .ok()
            .and_then(|idx| self.line_numbers.get(idx).copied())
            .unwrap_or(-1)
    }

    pub fn stack_trace_element(&self, label: i32) -> StackTraceElement {
        StackTraceElement {
            class_name: self.class_name.clone(),
            method_name: self.method_name.clone(),
            source_file: self.source_file.clone(),
            line: self.line_number(label),
        }
    }

    /// Spilled fields live at `label`, in declaration order.
    pub fn spilled_variable_mapping(&self, label: i32) -> Vec<FieldVariable> {
        self.spilled
            .iter()
            .zip(&self.local_names)
            .zip(&self.index_to_label)
            .filter(|(_, at)| **at == label)
            .map(|((field, name), _)| FieldVariable {
                field_name: field.clone(),
                variable_name: name.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../tests/metadata_tests.rs"]
mod tests;

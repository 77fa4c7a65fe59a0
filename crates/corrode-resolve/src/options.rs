//! Configuration for the resolution pass.

use serde::{Deserialize, Serialize};

/// Options for [`TreeTransformer`](crate::TreeTransformer) and
/// [`DeclarationIndex::with_builtins`](crate::DeclarationIndex::with_builtins).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ResolveOptions {
    /// Fully-qualified name of the universal root type.
    pub root_type: String,
    /// Fully-qualified name of the unit type.
    pub unit_type: String,
    /// Fully-qualified name of the generic array type used for varargs.
    pub array_type: String,
    /// Additional builtin classes registered by `with_builtins`.
    pub extra_builtins: Vec<String>,
    /// Packages star-imported into every file, lowest priority.
    pub default_imports: Vec<String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            root_type: "builtins.Any".to_string(),
            unit_type: "builtins.Unit".to_string(),
            array_type: "builtins.Array".to_string(),
            extra_builtins: vec![
                "builtins.Nothing".to_string(),
                "builtins.Int".to_string(),
                "builtins.String".to_string(),
                "builtins.Boolean".to_string(),
            ],
            default_imports: vec!["builtins".to_string()],
        }
    }
}

//! Custom-schema normalization into department, manager flag, functions, and permissions.
//!
//! Directory custom-schema values arrive in several shapes depending on how
//! the field was defined and edited: plain strings, lists, `{value: ...}`
//! wrappers, and `{values: [...]}` wrappers. Every function here is total;
//! unknown shapes are stringified rather than rejected.

use std::collections::{BTreeSet, HashSet};

use serde_json::{Map, Value};

/// Schema field holding the department scalar.
pub const HOME_DEPARTMENT_KEY: &str = "HomeDepartment";
/// Schema field holding the function list.
pub const USER_FUNCTIONS_KEY: &str = "UserFunctions";
/// Schema field holding the manager flag.
pub const MANAGER_KEY: &str = "DepartmentManager";

/// Structured output of normalizing one user's custom schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedSchema {
    /// Department, if any.
    pub home_department: Option<String>,
    /// Manager flag.
    pub is_department_manager: bool,
    /// Trimmed, deduplicated function strings in source order.
    pub functions: Vec<String>,
    /// Sorted, deduplicated permission strings.
    pub permissions: BTreeSet<String>,
}

/// Normalizes the custom schema selected by name from a raw user record.
#[derive(Debug, Clone)]
pub struct PermissionNormalizer {
    /// Custom schema name, e.g. `Authorization`.
    schema_name: String,
}

impl PermissionNormalizer {
    /// Creates a normalizer for the given schema name.
    pub fn new(schema_name: impl Into<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
        }
    }

    /// Pulls `customSchemas.<schema>` out of a raw user record.
    pub fn extract_schema<'a>(&self, user: &'a Value) -> Option<&'a Map<String, Value>> {
        user.get("customSchemas")
            .and_then(|schemas| schemas.get(&self.schema_name))
            .and_then(Value::as_object)
    }

    /// Normalizes a raw user record. Missing schema yields an empty profile.
    pub fn normalize_user(&self, user: &Value) -> NormalizedSchema {
        match self.extract_schema(user) {
            Some(schema) => normalize_schema(schema),
            None => NormalizedSchema::default(),
        }
    }
}

/// Normalizes an already-extracted custom schema map.
pub fn normalize_schema(schema: &Map<String, Value>) -> NormalizedSchema {
    let functions = coerce_list(schema.get(USER_FUNCTIONS_KEY));
    let permissions = derive_permissions(&functions);
    NormalizedSchema {
        home_department: coerce_scalar(schema.get(HOME_DEPARTMENT_KEY)),
        is_department_manager: coerce_bool(schema.get(MANAGER_KEY)),
        functions,
        permissions,
    }
}

/// First meaningful scalar of a value.
pub fn coerce_scalar(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::Array(items) => flatten_list(items).into_iter().next(),
        Value::Object(map) if map.contains_key("value") => {
            map.get("value").and_then(stringify)
        }
        other => stringify(other),
    }
}

/// Flattened, trimmed, deduplicated string list of a value.
pub fn coerce_list(value: Option<&Value>) -> Vec<String> {
    let raw = match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => flatten_list(items),
        Some(Value::Object(map)) => match (map.get("values"), map.get("value")) {
            (Some(Value::Array(items)), _) => flatten_list(items),
            (_, Some(inner)) => stringify(inner).into_iter().collect(),
            _ => stringify(&Value::Object(map.clone())).into_iter().collect(),
        },
        Some(other) => stringify(other).into_iter().collect(),
    };
    dedupe_trimmed(raw)
}

/// Truthy strings are `1`, `true`, `yes`, `y` (case-insensitive).
pub fn coerce_bool(value: Option<&Value>) -> bool {
    coerce_scalar(value)
        .map(|s| matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "y"))
        .unwrap_or(false)
}

/// One permission per function; sorted and deduplicated.
pub fn derive_permissions(functions: &[String]) -> BTreeSet<String> {
    functions
        .iter()
        .map(|f| normalize_permission(f))
        .filter(|p| !p.is_empty())
        .collect()
}

/// `Module Name:Action` → `module_name:action`; bare tokens slugify whole.
pub fn normalize_permission(function: &str) -> String {
    let trimmed = function.trim();
    match trimmed.split_once(':') {
        Some((module, action)) => format!("{}:{}", slugify(module), slugify(action)),
        None => slugify(trimmed),
    }
}

/// Lowercase, spaces to underscores, double underscores collapsed.
pub fn slugify(value: &str) -> String {
    let mut slug = value.trim().to_lowercase().replace(' ', "_");
    while slug.contains("__") {
        slug = slug.replace("__", "_");
    }
    slug
}

fn flatten_list(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|entry| match entry {
            Value::Object(map) if map.contains_key("value") => {
                map.get("value").and_then(stringify)
            }
            other => stringify(other),
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn dedupe_trimmed(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

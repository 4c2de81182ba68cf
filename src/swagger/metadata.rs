//! Documentation metadata attached to controllers and their methods.

use crate::swagger::spec::ParameterLocation;
use serde_json::{json, Value};

/// Summary and description of one operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiOperation {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub operation_id: Option<String>,
    pub deprecated: bool,
}

/// A documented parameter. Location defaults to `path`, `required` to true.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiParam {
    pub name: String,
    pub location: ParameterLocation,
    pub description: Option<String>,
    pub required: bool,
    pub schema: Option<Value>,
}

impl ApiParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: ParameterLocation::Path,
            description: None,
            required: true,
            schema: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiBody {
    pub description: Option<String>,
    pub required: bool,
    pub content_type: String,
    pub schema: Option<Value>,
}

impl Default for ApiBody {
    fn default() -> Self {
        Self {
            description: None,
            required: true,
            content_type: "application/json".to_string(),
            schema: None,
        }
    }
}

/// A documented response. `is_array` turns the schema into an array of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub description: Option<String>,
    pub schema: Option<Value>,
    pub is_array: bool,
}

impl ApiResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            description: None,
            schema: None,
            is_array: false,
        }
    }
}

/// Schema for a primitive type name such as `"integer"`, or a
/// reference-free object schema for anything else.
pub fn schema_for(type_name: &str) -> Value {
    match type_name {
        "string" | "integer" | "number" | "boolean" | "object" | "array" => {
            json!({ "type": type_name })
        }
        other => json!({ "type": "object", "title": other }),
    }
}

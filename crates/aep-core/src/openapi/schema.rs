use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A schema node. Shared by both dialects.
///
/// A node whose `ref_path` is set is a pure indirection: its other fields
/// carry no meaning and it must be dereferenced before use.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,

    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,

    #[serde(rename = "x-aep-resource", skip_serializing_if = "Option::is_none")]
    pub x_aep_resource: Option<XAepResource>,

    /// Wire field numbers keyed by number, independent of JSON key order.
    #[serde(
        rename = "x-aep-field-numbers",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub x_aep_field_numbers: IndexMap<u32, String>,

    #[serde(rename = "readOnly", default, skip_serializing_if = "is_false")]
    pub read_only: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Schema {
    /// A schema that only points at `ref_path`.
    pub fn reference(ref_path: impl Into<String>) -> Self {
        Self {
            ref_path: Some(ref_path.into()),
            ..Self::default()
        }
    }

    /// The reference pointer, if this node is an indirection. An empty
    /// `$ref` counts as no reference.
    pub fn ref_path(&self) -> Option<&str> {
        self.ref_path.as_deref().filter(|r| !r.is_empty())
    }

    pub fn is_array(&self) -> bool {
        self.schema_type.as_deref() == Some("array")
    }
}

/// The `x-aep-resource` annotation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct XAepResource {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub singular: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub plural: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

/// Last segment of a `$ref` pointer: `#/components/schemas/Book` → `Book`.
pub fn ref_key(ref_path: &str) -> &str {
    ref_path.rsplit('/').next().unwrap_or(ref_path)
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_key() {
        assert_eq!(ref_key("#/components/schemas/Book"), "Book");
        assert_eq!(ref_key("#/definitions/Publisher"), "Publisher");
        assert_eq!(ref_key("Book"), "Book");
    }

    #[test]
    fn test_empty_ref_is_not_a_reference() {
        let schema = Schema {
            ref_path: Some(String::new()),
            ..Schema::default()
        };
        assert!(schema.ref_path().is_none());
        assert_eq!(Schema::reference("#/a/B").ref_path(), Some("#/a/B"));
    }

    #[test]
    fn test_parse_annotations() {
        let json = r#"{
            "type": "object",
            "x-aep-resource": {
                "singular": "book",
                "plural": "books",
                "patterns": ["/publishers/{publisher}/books/{book}"],
                "parents": ["publisher"]
            },
            "x-aep-field-numbers": {"1": "price", "10018": "path"},
            "properties": {
                "price": {"type": "string"},
                "path": {"type": "string", "readOnly": true}
            }
        }"#;
        let schema: Schema = serde_json::from_str(json).unwrap();
        let resource = schema.x_aep_resource.as_ref().unwrap();
        assert_eq!(resource.plural, "books");
        assert_eq!(resource.parents, vec!["publisher"]);
        assert_eq!(schema.x_aep_field_numbers[&10018], "path");
        assert!(schema.properties["path"].read_only);
        assert!(!schema.properties["price"].read_only);
    }
}

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::path::placeholder_name;
use crate::error::PatternError;
use crate::openapi::schema::Schema;

/// A resource type exposed by the API.
///
/// `pattern_elems` alternates literal collection names (even indices) and
/// `{placeholder}` tokens (odd indices), ending with the placeholder for the
/// resource's own id: `["publishers", "{publisher}", "books", "{book}"]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Resource {
    pub singular: String,
    pub plural: String,
    pub pattern_elems: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_method: Option<CreateMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_method: Option<ListMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get_method: Option<GetMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_method: Option<UpdateMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_method: Option<DeleteMethod>,

    /// Singular names of the parent resources.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_methods: Vec<CustomMethod>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateMethod {
    /// The caller may choose the new resource's id, sent as `?id=`.
    pub supports_user_settable_create: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListMethod {
    pub has_unreachable_resources: bool,
    pub supports_filter: bool,
    pub supports_skip: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GetMethod {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateMethod {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteMethod {}

/// A non-standard method such as `POST .../books/{book}:archive`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomMethod {
    pub name: String,
    /// `GET` or `POST`.
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Schema>,
}

impl Resource {
    /// Build a resource from a pattern string such as
    /// `publishers/{publisher}/books/{book}`.
    ///
    /// The singular name is the trailing placeholder, the plural name the
    /// collection literal before it. All standard methods are enabled, with
    /// user-settable ids off.
    pub fn from_pattern(pattern: &str) -> Result<Self, PatternError> {
        let elems = split_pattern(pattern);
        validate_pattern(pattern, &elems)?;

        let singular = placeholder_name(&elems[elems.len() - 1]).to_string();
        let plural = elems[elems.len() - 2].clone();
        Ok(Resource {
            singular,
            plural,
            pattern_elems: elems,
            create_method: Some(CreateMethod::default()),
            list_method: Some(ListMethod::default()),
            get_method: Some(GetMethod {}),
            update_method: Some(UpdateMethod {}),
            delete_method: Some(DeleteMethod {}),
            parents: Vec::new(),
            custom_methods: Vec::new(),
        })
    }

    /// Build a resource from a schema's `x-aep-resource` annotation, using
    /// its first pattern.
    pub fn from_schema(schema: &Schema) -> Result<Self, PatternError> {
        let annotation = schema
            .x_aep_resource
            .as_ref()
            .ok_or_else(|| PatternError::Malformed {
                pattern: String::new(),
                reason: "schema has no x-aep-resource annotation".to_string(),
            })?;
        let pattern = annotation
            .patterns
            .first()
            .ok_or_else(|| PatternError::Malformed {
                pattern: String::new(),
                reason: format!("resource {:?} declares no patterns", annotation.singular),
            })?;

        let mut resource = Self::from_pattern(pattern)?;
        if !annotation.singular.is_empty() {
            resource.singular = annotation.singular.clone();
        }
        if !annotation.plural.is_empty() {
            resource.plural = annotation.plural.clone();
        }
        resource.parents = annotation.parents.clone();
        Ok(resource)
    }

    /// Drop every standard method, for callers that discover them one by one.
    pub fn without_methods(self) -> Self {
        Resource {
            create_method: None,
            list_method: None,
            get_method: None,
            update_method: None,
            delete_method: None,
            ..self
        }
    }

    /// Allow or forbid caller-chosen ids on create.
    pub fn with_user_settable_create(mut self, enabled: bool) -> Self {
        self.create_method = Some(CreateMethod {
            supports_user_settable_create: enabled,
        });
        self
    }

    pub fn supports_user_settable_create(&self) -> bool {
        self.create_method
            .is_some_and(|m| m.supports_user_settable_create)
    }

    /// The pattern joined back into its string form.
    pub fn pattern(&self) -> String {
        self.pattern_elems.join("/")
    }
}

fn split_pattern(pattern: &str) -> Vec<String> {
    pattern
        .trim_start_matches('/')
        .split('/')
        .map(str::to_string)
        .collect()
}

fn validate_pattern(pattern: &str, elems: &[String]) -> Result<(), PatternError> {
    let malformed = |reason: String| PatternError::Malformed {
        pattern: pattern.to_string(),
        reason,
    };

    if elems.len() < 2 || elems.len() % 2 != 0 {
        return Err(malformed(
            "expected alternating collection and {placeholder} segments".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for (i, elem) in elems.iter().enumerate() {
        let wrapped = elem.len() > 2 && elem.starts_with('{') && elem.ends_with('}');
        if i % 2 == 0 {
            if elem.is_empty() || elem.contains(['{', '}']) {
                return Err(malformed(format!("segment {i} must be a collection name")));
            }
        } else {
            if !wrapped {
                return Err(malformed(format!("segment {i} must be a {{placeholder}}")));
            }
            if !seen.insert(placeholder_name(elem)) {
                return Err(malformed(format!(
                    "placeholder {elem} appears more than once"
                )));
            }
        }
    }
    Ok(())
}

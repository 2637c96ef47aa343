use indexmap::IndexMap;
use log::{debug, warn};

use super::path::placeholder_name;
use super::resource::{
    CreateMethod, CustomMethod, DeleteMethod, GetMethod, ListMethod, Resource, UpdateMethod,
};
use crate::cases::pascal_case_to_kebab_case;
use crate::constants::{FIELD_FILTER_NAME, FIELD_ID_NAME, FIELD_SKIP_NAME, FIELD_UNREACHABLE_NAME};
use crate::error::ApiError;
use crate::openapi::operation::{Operation, PathItem};
use crate::openapi::response::Response;
use crate::openapi::schema::{Schema, ref_key};
use crate::openapi::spec::{Contact, OpenApi};

const SUCCESS_STATUS: &str = "200";

/// The resources and plain schemas an API description exposes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Api {
    pub name: String,
    pub server_url: Option<String>,
    pub contact: Option<Contact>,
    /// Keyed by singular name. Parents come before their children.
    pub resources: IndexMap<String, Resource>,
    /// Definitions that are not resources.
    pub schemas: IndexMap<String, Schema>,
}

impl Api {
    /// Collect resources by walking the document's paths.
    ///
    /// Collection paths (`.../books`) contribute create and list, resource
    /// paths (`.../books/{book}`) get, update and delete, and
    /// `{resource}:verb` paths custom methods. A resource is named after the
    /// definition its responses point at; its pattern and plural come from
    /// the definition's `x-aep-resource` annotation when present.
    pub fn from_openapi(doc: &OpenApi) -> Result<Self, ApiError> {
        let mut builder = Builder {
            doc,
            resources: IndexMap::new(),
            custom_methods: IndexMap::new(),
        };

        for (path, item) in &doc.paths {
            let Some(shape) = PathShape::parse(path) else {
                debug!("skipping {path}: not a resource pattern");
                continue;
            };
            match shape.custom_method {
                Some(name) if shape.is_resource() => {
                    builder.add_custom_methods(&shape, name, item)?
                }
                Some(_) => debug!("skipping {path}: custom method on a collection"),
                None => builder.add_standard_methods(path, &shape, item)?,
            }
        }

        let Builder {
            mut resources,
            custom_methods,
            ..
        } = builder;
        for (pattern, methods) in custom_methods {
            match resources.values_mut().find(|r| r.pattern() == pattern) {
                Some(resource) => resource.custom_methods = methods,
                None => warn!("custom methods on {pattern} have no matching resource"),
            }
        }

        let schemas = doc
            .dialect
            .definitions()
            .iter()
            .filter(|(name, schema)| {
                schema.x_aep_resource.is_none() && !resources.contains_key(name.as_str())
            })
            .map(|(name, schema)| (name.clone(), schema.clone()))
            .collect();

        Ok(Api {
            name: doc.info.title.clone(),
            server_url: doc.server_url(),
            contact: doc.contact().cloned(),
            resources,
            schemas,
        })
    }

    pub fn resource(&self, singular: &str) -> Result<&Resource, ApiError> {
        self.resources
            .get(singular)
            .ok_or_else(|| ApiError::ResourceNotFound(singular.to_string()))
    }
}

/// A path split into segments, with any `:verb` suffix removed.
struct PathShape<'p> {
    elems: Vec<&'p str>,
    custom_method: Option<&'p str>,
}

impl<'p> PathShape<'p> {
    /// `None` unless segments alternate literal and `{placeholder}`.
    fn parse(path: &'p str) -> Option<Self> {
        let (path, custom_method) = match path.split_once(':') {
            Some((path, name)) => (path, Some(name)),
            None => (path, None),
        };
        let elems: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        for (i, elem) in elems.iter().enumerate() {
            let wrapped = elem.len() > 2 && elem.starts_with('{') && elem.ends_with('}');
            if elem.is_empty() || wrapped != (i % 2 == 1) {
                return None;
            }
        }
        Some(PathShape {
            elems,
            custom_method,
        })
    }

    /// Ends in a placeholder, i.e. addresses a single resource.
    fn is_resource(&self) -> bool {
        self.elems.len() % 2 == 0
    }
}

struct Builder<'a> {
    doc: &'a OpenApi,
    resources: IndexMap<String, Resource>,
    custom_methods: IndexMap<String, Vec<CustomMethod>>,
}

impl<'a> Builder<'a> {
    fn add_standard_methods(
        &mut self,
        path: &str,
        shape: &PathShape<'_>,
        item: &'a PathItem,
    ) -> Result<(), ApiError> {
        let doc = self.doc;
        let mut found = Resource::default();
        let mut schema_ref: Option<&'a Schema> = None;

        if shape.is_resource() {
            if item.delete.is_some() {
                found.delete_method = Some(DeleteMethod {});
            }
            if let Some(response) = success_response(item.get.as_ref()) {
                schema_ref = doc.schema_from_response(response).or(schema_ref);
                found.get_method = Some(GetMethod {});
            }
            if let Some(response) = success_response(item.patch.as_ref()) {
                schema_ref = doc.schema_from_response(response).or(schema_ref);
                found.update_method = Some(UpdateMethod {});
            }
        } else {
            if let Some(op) = item.post.as_ref() {
                if let Some(response) = success_response(Some(op)) {
                    schema_ref = doc.schema_from_response(response).or(schema_ref);
                    found.create_method = Some(CreateMethod {
                        supports_user_settable_create: op.has_parameter(FIELD_ID_NAME),
                    });
                }
            }
            if let Some(op) = item.get.as_ref() {
                if let Some(items) = self.list_items_schema(path, op)? {
                    schema_ref = Some(items);
                    found.list_method = Some(list_method(op));
                }
            }
        }

        let Some(schema_ref) = schema_ref else {
            return Ok(());
        };
        let Some(ref_path) = schema_ref.ref_path() else {
            debug!("skipping {path}: response schema is inline");
            return Ok(());
        };

        let singular = pascal_case_to_kebab_case(ref_key(ref_path));
        let mut pattern: Vec<String> = shape.elems.iter().map(|e| e.to_string()).collect();
        if !shape.is_resource() {
            let own = own_placeholder(&singular, &pattern);
            pattern.push(format!("{{{own}}}"));
        }

        let schema = doc.dereference_schema(schema_ref)?;
        let key = self.populate(&singular, &pattern, schema, &mut Vec::new())?;
        if let Some(resource) = self.resources.get_mut(&key) {
            merge_methods(resource, &found);
        }
        Ok(())
    }

    /// The item schema of a list response: the first array property of the
    /// dereferenced `200` body.
    fn list_items_schema(
        &self,
        path: &str,
        op: &'a Operation,
    ) -> Result<Option<&'a Schema>, ApiError> {
        let doc = self.doc;
        let Some(response) = success_response(Some(op)) else {
            return Ok(None);
        };
        let Some(schema) = doc.schema_from_response(response) else {
            warn!("{path}: list response has no schema");
            return Ok(None);
        };
        let resolved = doc.dereference_schema(schema)?;
        match resolved.properties.values().find(|p| p.is_array()) {
            Some(array) => Ok(array.items.as_deref()),
            None => {
                warn!("{path}: list response has no array property");
                Ok(None)
            }
        }
    }

    /// Insert the resource `schema` describes and, recursively, its
    /// parents. Returns the key it is stored under, which is the
    /// annotation's singular name when there is one.
    fn populate(
        &mut self,
        singular: &str,
        pattern: &[String],
        schema: &'a Schema,
        visiting: &mut Vec<String>,
    ) -> Result<String, ApiError> {
        let resource = match schema.x_aep_resource {
            Some(_) => Resource::from_schema(schema)?,
            None => Resource {
                singular: singular.to_string(),
                ..Resource::from_pattern(&pattern.join("/"))?
            },
        };
        let key = resource.singular.clone();
        if self.resources.contains_key(&key) {
            return Ok(key);
        }
        if visiting.contains(&key) {
            return Err(ApiError::ParentCycle(key));
        }

        visiting.push(key.clone());
        let doc = self.doc;
        for parent in &resource.parents {
            let parent_schema = doc.schema(parent).map_err(|_| ApiError::ParentNotFound {
                resource: key.clone(),
                parent: parent.clone(),
            })?;
            let parent_schema = doc.dereference_schema(parent_schema)?;
            self.populate(parent, &[], parent_schema, visiting)?;
        }
        visiting.pop();

        debug!("found resource {key} at {}", resource.pattern());
        self.resources.insert(key.clone(), resource.without_methods());
        Ok(key)
    }

    fn add_custom_methods(
        &mut self,
        shape: &PathShape<'_>,
        name: &str,
        item: &'a PathItem,
    ) -> Result<(), ApiError> {
        let doc = self.doc;
        let methods = self
            .custom_methods
            .entry(shape.elems.join("/"))
            .or_default();

        if let Some(op) = item.post.as_ref() {
            if let Some(response) = success_response(Some(op)) {
                let body = op
                    .request_body
                    .as_ref()
                    .ok_or_else(|| ApiError::MissingRequestBody(name.to_string()))?;
                let request = doc
                    .schema_from_request_body(body)
                    .map(|s| doc.dereference_schema(s))
                    .transpose()?;
                methods.push(CustomMethod {
                    name: name.to_string(),
                    method: "POST".to_string(),
                    request: request.cloned(),
                    response: resolved_response(doc, response)?,
                });
            }
        }
        if let Some(response) = success_response(item.get.as_ref()) {
            methods.push(CustomMethod {
                name: name.to_string(),
                method: "GET".to_string(),
                request: None,
                response: resolved_response(doc, response)?,
            });
        }
        Ok(())
    }
}

fn success_response(op: Option<&Operation>) -> Option<&Response> {
    op.and_then(|op| op.responses.get(SUCCESS_STATUS))
}

fn resolved_response(doc: &OpenApi, response: &Response) -> Result<Option<Schema>, ApiError> {
    let schema = doc
        .schema_from_response(response)
        .map(|s| doc.dereference_schema(s))
        .transpose()?;
    Ok(schema.cloned())
}

fn list_method(op: &Operation) -> ListMethod {
    ListMethod {
        has_unreachable_resources: op.has_parameter(FIELD_UNREACHABLE_NAME),
        supports_filter: op.has_parameter(FIELD_FILTER_NAME),
        supports_skip: op.has_parameter(FIELD_SKIP_NAME),
    }
}

/// Placeholder name for a resource found through its collection path.
/// A `book-edition` under `{book}` becomes `{edition}`.
fn own_placeholder(singular: &str, collection: &[String]) -> String {
    let parent = collection
        .len()
        .checked_sub(2)
        .map(|i| placeholder_name(&collection[i]));
    parent
        .and_then(|p| singular.strip_prefix(p))
        .and_then(|rest| rest.strip_prefix('-'))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(singular)
        .to_string()
}

fn merge_methods(resource: &mut Resource, found: &Resource) {
    if found.create_method.is_some() {
        resource.create_method = found.create_method;
    }
    if found.list_method.is_some() {
        resource.list_method = found.list_method;
    }
    if found.get_method.is_some() {
        resource.get_method = found.get_method;
    }
    if found.update_method.is_some() {
        resource.update_method = found.update_method;
    }
    if found.delete_method.is_some() {
        resource.delete_method = found.delete_method;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::from_json;

    fn annotated(singular: &str, pattern: &str, parents: &[&str]) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "x-aep-resource": {
                "singular": singular,
                "plural": format!("{singular}s"),
                "patterns": [pattern],
                "parents": parents,
            }
        })
    }

    fn document(paths: serde_json::Value, schemas: serde_json::Value) -> OpenApi {
        let doc = serde_json::json!({
            "openapi": "3.0.0",
            "info": {"title": "test", "version": "1"},
            "paths": paths,
            "components": {"schemas": schemas},
        });
        from_json(&doc.to_string()).unwrap()
    }

    fn ok_response(name: &str) -> serde_json::Value {
        serde_json::json!({
            "200": {
                "description": "ok",
                "content": {"application/json": {"schema": {"$ref": format!("#/components/schemas/{name}")}}}
            }
        })
    }

    #[test]
    fn test_path_shape() {
        let collection = PathShape::parse("/publishers/{publisher}/books").unwrap();
        assert!(!collection.is_resource());
        assert_eq!(collection.elems, vec!["publishers", "{publisher}", "books"]);

        let resource = PathShape::parse("/publishers/{publisher}").unwrap();
        assert!(resource.is_resource());
        assert!(resource.custom_method.is_none());

        let custom = PathShape::parse("/books/{book}:archive").unwrap();
        assert!(custom.is_resource());
        assert_eq!(custom.custom_method, Some("archive"));

        assert!(PathShape::parse("/{publisher}/books").is_none());
        assert!(PathShape::parse("/publishers/publisher").is_none());
        assert!(PathShape::parse("/publishers//books").is_none());
    }

    #[test]
    fn test_own_placeholder() {
        let under_book = ["books".to_string(), "{book}".to_string(), "editions".to_string()];
        assert_eq!(own_placeholder("book-edition", &under_book), "edition");
        assert_eq!(own_placeholder("edition", &under_book), "edition");
        assert_eq!(own_placeholder("book", &under_book), "book");
        assert_eq!(own_placeholder("publisher", &["publishers".to_string()]), "publisher");
    }

    #[test]
    fn test_merge_keeps_existing_methods() {
        let mut resource = Resource::from_pattern("books/{book}")
            .unwrap()
            .without_methods();
        resource.get_method = Some(GetMethod {});

        let found = Resource {
            delete_method: Some(DeleteMethod {}),
            ..Resource::default()
        };
        merge_methods(&mut resource, &found);
        assert!(resource.get_method.is_some());
        assert!(resource.delete_method.is_some());
        assert!(resource.create_method.is_none());
    }

    #[test]
    fn test_list_flags_from_parameters() {
        let doc = document(
            serde_json::json!({
                "/shelves/{shelf}/book-editions": {
                    "get": {
                        "parameters": [
                            {"name": "skip", "in": "query"},
                            {"name": "filter", "in": "query"}
                        ],
                        "responses": ok_response("list")
                    }
                }
            }),
            serde_json::json!({
                "list": {
                    "type": "object",
                    "properties": {
                        "next_page_token": {"type": "string"},
                        "results": {"type": "array", "items": {"$ref": "#/components/schemas/ShelfBookEdition"}}
                    }
                },
                "ShelfBookEdition": {"type": "object"}
            }),
        );
        let api = Api::from_openapi(&doc).unwrap();

        let edition = api.resource("shelf-book-edition").unwrap();
        assert_eq!(edition.pattern(), "shelves/{shelf}/book-editions/{book-edition}");
        assert_eq!(
            edition.list_method,
            Some(ListMethod {
                has_unreachable_resources: false,
                supports_filter: true,
                supports_skip: true,
            })
        );
        assert!(edition.create_method.is_none());
    }

    #[test]
    fn test_missing_parent_schema() {
        let doc = document(
            serde_json::json!({"/books/{book}": {"get": {"responses": ok_response("book")}}}),
            serde_json::json!({"book": annotated("book", "/books/{book}", &["shelf"])}),
        );
        let err = Api::from_openapi(&doc).unwrap_err();
        assert!(matches!(
            err,
            ApiError::ParentNotFound { resource, parent } if resource == "book" && parent == "shelf"
        ));
    }

    #[test]
    fn test_parent_cycle() {
        let doc = document(
            serde_json::json!({"/as/{a}": {"get": {"responses": ok_response("a")}}}),
            serde_json::json!({
                "a": annotated("a", "/bs/{b}/as/{a}", &["b"]),
                "b": annotated("b", "/as/{a}/bs/{b}", &["a"]),
            }),
        );
        let err = Api::from_openapi(&doc).unwrap_err();
        assert!(matches!(err, ApiError::ParentCycle(name) if name == "a"));
    }

    #[test]
    fn test_custom_post_needs_request_body() {
        let doc = document(
            serde_json::json!({
                "/books/{book}": {"get": {"responses": ok_response("book")}},
                "/books/{book}:archive": {"post": {"responses": ok_response("book")}}
            }),
            serde_json::json!({"book": {"type": "object"}}),
        );
        let err = Api::from_openapi(&doc).unwrap_err();
        assert!(matches!(err, ApiError::MissingRequestBody(name) if name == "archive"));
    }

    #[test]
    fn test_custom_get_and_unmatched_paths() {
        let doc = document(
            serde_json::json!({
                "/books/{book}": {"get": {"responses": ok_response("book")}},
                "/books/{book}:preview": {"get": {"responses": ok_response("book")}},
                "/books:search": {"get": {"responses": ok_response("book")}},
                "/health": {"get": {"responses": ok_response("book")}}
            }),
            serde_json::json!({"book": {"type": "object"}}),
        );
        let api = Api::from_openapi(&doc).unwrap();

        assert_eq!(api.resources.len(), 1);
        let book = api.resource("book").unwrap();
        assert_eq!(book.custom_methods.len(), 1);
        assert_eq!(book.custom_methods[0].name, "preview");
        assert_eq!(book.custom_methods[0].method, "GET");
        assert!(book.custom_methods[0].request.is_none());
    }
}

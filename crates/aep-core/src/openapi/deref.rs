use std::collections::HashSet;

use log::debug;

use super::response::{RequestBody, Response};
use super::schema::{Schema, ref_key};
use super::spec::{Dialect, OpenApi};
use crate::constants::CONTENT_TYPE_JSON;
use crate::error::ResolveError;

impl OpenApi {
    /// Follow `$ref` pointers until a concrete schema is reached.
    ///
    /// The pointer's last segment is looked up in the dialect's definitions
    /// table, and the result is dereferenced again, so chains of references
    /// resolve to their final target. A chain that revisits a pointer fails
    /// with [`ResolveError::CircularRef`].
    pub fn dereference_schema<'a>(&'a self, schema: &'a Schema) -> Result<&'a Schema, ResolveError> {
        let mut visited = HashSet::new();
        self.dereference_chain(schema, &mut visited)
    }

    fn dereference_chain<'a>(
        &'a self,
        schema: &'a Schema,
        visited: &mut HashSet<&'a str>,
    ) -> Result<&'a Schema, ResolveError> {
        let Some(ref_path) = schema.ref_path() else {
            return Ok(schema);
        };
        if !visited.insert(ref_path) {
            return Err(ResolveError::CircularRef(ref_path.to_string()));
        }

        let key = ref_key(ref_path);
        match &self.dialect {
            Dialect::Swagger2 { .. } => debug!("oas 2.0 definition lookup: {key}"),
            Dialect::OpenApi3 { .. } => debug!("oas 3 component lookup: {key}"),
        }
        let child = self
            .dialect
            .definitions()
            .get(key)
            .ok_or_else(|| ResolveError::SchemaNotFound(ref_path.to_string()))?;
        self.dereference_chain(child, visited)
    }

    /// Dereference `schema` and every nested property and item schema,
    /// producing an owned tree with no `$ref` left in it.
    pub fn resolve_deep(&self, schema: &Schema) -> Result<Schema, ResolveError> {
        let mut stack = Vec::new();
        self.resolve_deep_inner(schema, &mut stack)
    }

    fn resolve_deep_inner<'a>(
        &'a self,
        schema: &'a Schema,
        stack: &mut Vec<&'a str>,
    ) -> Result<Schema, ResolveError> {
        let mut pushed = 0;
        let mut current = schema;
        while let Some(ref_path) = current.ref_path() {
            if stack.contains(&ref_path) {
                return Err(ResolveError::CircularRef(ref_path.to_string()));
            }
            stack.push(ref_path);
            pushed += 1;
            current = self
                .dialect
                .definitions()
                .get(ref_key(ref_path))
                .ok_or_else(|| ResolveError::SchemaNotFound(ref_path.to_string()))?;
        }

        let mut resolved = current.clone();
        for (name, prop) in &current.properties {
            resolved
                .properties
                .insert(name.clone(), self.resolve_deep_inner(prop, stack)?);
        }
        if let Some(ref items) = current.items {
            resolved.items = Some(Box::new(self.resolve_deep_inner(items, stack)?));
        }

        stack.truncate(stack.len() - pushed);
        Ok(resolved)
    }

    /// Look up a definition by its bare name, e.g. `Book`.
    pub fn schema(&self, name: &str) -> Result<&Schema, ResolveError> {
        self.dialect
            .definitions()
            .get(name)
            .ok_or_else(|| ResolveError::NotADefinition(name.to_string()))
    }

    /// The schema a response carries: on the response itself for Swagger 2,
    /// under the `application/json` media type for OpenAPI 3.
    pub fn schema_from_response<'a>(&self, response: &'a Response) -> Option<&'a Schema> {
        match self.dialect {
            Dialect::Swagger2 { .. } => response.schema.as_ref(),
            Dialect::OpenApi3 { .. } => response
                .content
                .get(CONTENT_TYPE_JSON)
                .and_then(|m| m.schema.as_ref()),
        }
    }

    /// Request-body counterpart of [`OpenApi::schema_from_response`].
    pub fn schema_from_request_body<'a>(&self, body: &'a RequestBody) -> Option<&'a Schema> {
        match self.dialect {
            Dialect::Swagger2 { .. } => body.schema.as_ref(),
            Dialect::OpenApi3 { .. } => body
                .content
                .get(CONTENT_TYPE_JSON)
                .and_then(|m| m.schema.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::openapi::response::MediaType;
    use crate::openapi::spec::{Components, Info};

    fn object(prop: &str) -> Schema {
        let mut properties = IndexMap::new();
        properties.insert(
            prop.to_string(),
            Schema {
                schema_type: Some("string".to_string()),
                ..Schema::default()
            },
        );
        Schema {
            schema_type: Some("object".to_string()),
            properties,
            ..Schema::default()
        }
    }

    fn v3(schemas: IndexMap<String, Schema>) -> OpenApi {
        OpenApi {
            info: Info::default(),
            servers: Vec::new(),
            paths: IndexMap::new(),
            dialect: Dialect::OpenApi3 {
                version: "3.1.0".to_string(),
                components: Components { schemas },
            },
        }
    }

    fn v2(definitions: IndexMap<String, Schema>) -> OpenApi {
        OpenApi {
            info: Info::default(),
            servers: Vec::new(),
            paths: IndexMap::new(),
            dialect: Dialect::Swagger2 {
                definitions,
                host: None,
                base_path: None,
                schemes: Vec::new(),
            },
        }
    }

    #[test]
    fn test_plain_schema_is_returned_unchanged() {
        let doc = v3(IndexMap::new());
        let schema = object("price");
        let resolved = doc.dereference_schema(&schema).unwrap();
        assert_eq!(resolved, &schema);
    }

    #[test]
    fn test_reference_chain_resolves_to_concrete_schema() {
        let mut schemas = IndexMap::new();
        schemas.insert("A".to_string(), Schema::reference("#/components/schemas/B"));
        schemas.insert("B".to_string(), Schema::reference("#/components/schemas/C"));
        schemas.insert("C".to_string(), object("title"));
        let doc = v3(schemas);

        let start = Schema::reference("#/components/schemas/A");
        let resolved = doc.dereference_schema(&start).unwrap();
        assert!(resolved.properties.contains_key("title"));
        assert!(resolved.ref_path().is_none());
    }

    #[test]
    fn test_missing_reference_fails() {
        let doc = v3(IndexMap::new());
        let start = Schema::reference("#/components/schemas/Missing");
        let err = doc.dereference_schema(&start).unwrap_err();
        match err {
            ResolveError::SchemaNotFound(r) => assert_eq!(r, "#/components/schemas/Missing"),
            other => panic!("expected SchemaNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_dialect_selects_definitions_table() {
        let mut table = IndexMap::new();
        table.insert("Book".to_string(), object("isbn"));

        let swagger = v2(table.clone());
        let openapi = v3(table);

        let v2_ref = Schema::reference("#/definitions/Book");
        assert!(swagger.dereference_schema(&v2_ref).is_ok());

        // Same key, but an empty table for the dialect in use.
        let empty_v2 = v2(IndexMap::new());
        assert!(empty_v2.dereference_schema(&v2_ref).is_err());
        let v3_ref = Schema::reference("#/components/schemas/Book");
        assert!(openapi.dereference_schema(&v3_ref).is_ok());
        let empty_v3 = v3(IndexMap::new());
        assert!(empty_v3.dereference_schema(&v3_ref).is_err());
    }

    #[test]
    fn test_circular_chain_fails_instead_of_diverging() {
        let mut schemas = IndexMap::new();
        schemas.insert("A".to_string(), Schema::reference("#/components/schemas/B"));
        schemas.insert("B".to_string(), Schema::reference("#/components/schemas/A"));
        let doc = v3(schemas);

        let start = Schema::reference("#/components/schemas/A");
        assert!(matches!(
            doc.dereference_schema(&start),
            Err(ResolveError::CircularRef(_))
        ));
    }

    #[test]
    fn test_resolve_deep_inlines_nested_refs() {
        let mut book = object("title");
        book.properties.insert(
            "author".to_string(),
            Schema::reference("#/components/schemas/Author"),
        );
        let mut schemas = IndexMap::new();
        schemas.insert("Book".to_string(), book);
        schemas.insert("Author".to_string(), object("name"));
        let list = Schema {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(Schema::reference("#/components/schemas/Book"))),
            ..Schema::default()
        };
        let doc = v3(schemas);

        let resolved = doc.resolve_deep(&list).unwrap();
        let item = resolved.items.as_ref().unwrap();
        let author = &item.properties["author"];
        assert!(author.ref_path().is_none());
        assert!(author.properties.contains_key("name"));
    }

    #[test]
    fn test_resolve_deep_allows_repeated_siblings() {
        let mut pair = object("label");
        pair.properties
            .insert("left".to_string(), Schema::reference("#/definitions/Leaf"));
        pair.properties
            .insert("right".to_string(), Schema::reference("#/definitions/Leaf"));
        let mut definitions = IndexMap::new();
        definitions.insert("Leaf".to_string(), object("value"));
        let doc = v2(definitions);

        let resolved = doc.resolve_deep(&pair).unwrap();
        assert!(resolved.properties["left"].properties.contains_key("value"));
        assert!(resolved.properties["right"].properties.contains_key("value"));
    }

    #[test]
    fn test_resolve_deep_rejects_self_referencing_schema() {
        let mut node = object("value");
        node.properties
            .insert("next".to_string(), Schema::reference("#/components/schemas/Node"));
        let mut schemas = IndexMap::new();
        schemas.insert("Node".to_string(), node);
        let doc = v3(schemas);

        let start = Schema::reference("#/components/schemas/Node");
        assert!(matches!(
            doc.resolve_deep(&start),
            Err(ResolveError::CircularRef(_))
        ));
    }

    #[test]
    fn test_schema_accessors_follow_dialect() {
        let response = Response {
            description: None,
            content: IndexMap::from([(
                CONTENT_TYPE_JSON.to_string(),
                MediaType {
                    schema: Some(object("from_content")),
                },
            )]),
            schema: Some(object("from_root")),
        };

        let swagger = v2(IndexMap::new());
        let openapi = v3(IndexMap::new());
        let s2 = swagger.schema_from_response(&response).unwrap();
        let s3 = openapi.schema_from_response(&response).unwrap();
        assert!(s2.properties.contains_key("from_root"));
        assert!(s3.properties.contains_key("from_content"));

        let body = RequestBody {
            schema: Some(object("from_root")),
            ..RequestBody::default()
        };
        assert!(swagger.schema_from_request_body(&body).is_some());
        assert!(openapi.schema_from_request_body(&body).is_none());
    }

    #[test]
    fn test_schema_lookup_by_name() {
        let mut schemas = IndexMap::new();
        schemas.insert("Book".to_string(), object("isbn"));
        let doc = v3(schemas);
        assert!(doc.schema("Book").is_ok());
        assert!(matches!(
            doc.schema("Shelf"),
            Err(ResolveError::NotADefinition(_))
        ));
    }
}

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::operation::PathItem;
use super::schema::Schema;
use super::server::Server;
use crate::error::ParseError;

/// Info object describing the API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Info {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
}

/// Contact information.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Contact {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.url.is_none()
    }
}

/// OpenAPI 3 components. Only schemas take part in dereferencing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Schema>,
}

/// The document dialect, chosen once when the document is parsed. Each
/// variant owns the definitions table that `$ref` pointers resolve against.
#[derive(Debug, Clone, PartialEq)]
pub enum Dialect {
    /// Swagger 2.0: definitions at the document root.
    Swagger2 {
        definitions: IndexMap<String, Schema>,
        host: Option<String>,
        base_path: Option<String>,
        schemes: Vec<String>,
    },
    /// OpenAPI 3.x: definitions under `components.schemas`.
    OpenApi3 {
        version: String,
        components: Components,
    },
}

impl Dialect {
    /// The table `$ref` keys are looked up in.
    pub fn definitions(&self) -> &IndexMap<String, Schema> {
        match self {
            Dialect::Swagger2 { definitions, .. } => definitions,
            Dialect::OpenApi3 { components, .. } => &components.schemas,
        }
    }

    pub fn is_swagger2(&self) -> bool {
        matches!(self, Dialect::Swagger2 { .. })
    }
}

/// A parsed API description, read-only after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenApi {
    pub info: Info,
    pub servers: Vec<Server>,
    pub paths: IndexMap<String, PathItem>,
    pub dialect: Dialect,
}

/// Wire layout covering both dialects, before the dialect is known.
#[derive(Debug, Deserialize)]
pub(crate) struct RawDocument {
    #[serde(default)]
    swagger: Option<String>,
    #[serde(default)]
    openapi: Option<String>,
    #[serde(default)]
    info: Info,
    #[serde(default)]
    servers: Vec<Server>,
    #[serde(default)]
    paths: IndexMap<String, PathItem>,
    #[serde(default)]
    components: Option<Components>,
    #[serde(default)]
    definitions: IndexMap<String, Schema>,
    #[serde(default)]
    host: Option<String>,
    #[serde(rename = "basePath", default)]
    base_path: Option<String>,
    #[serde(default)]
    schemes: Vec<String>,
}

impl TryFrom<RawDocument> for OpenApi {
    type Error = ParseError;

    fn try_from(raw: RawDocument) -> Result<Self, Self::Error> {
        let RawDocument {
            swagger,
            openapi,
            info,
            servers,
            paths,
            components,
            definitions,
            host,
            base_path,
            schemes,
        } = raw;
        let swagger = swagger.filter(|v| !v.is_empty());
        let openapi = openapi.filter(|v| !v.is_empty());

        let is_swagger2 = match (swagger.as_deref(), openapi.as_deref()) {
            (Some(v), _) if v.starts_with("2.") => true,
            (Some(v), _) => return Err(ParseError::UnsupportedVersion(v.to_string())),
            // Some generators emit `openapi: "2.0"` for Swagger documents.
            (None, Some(v)) => v.starts_with("2."),
            (None, None) => return Err(ParseError::MissingField("openapi".to_string())),
        };

        let dialect = if is_swagger2 {
            Dialect::Swagger2 {
                definitions,
                host,
                base_path,
                schemes,
            }
        } else {
            Dialect::OpenApi3 {
                version: openapi.unwrap_or_default(),
                components: components.unwrap_or_default(),
            }
        };

        Ok(OpenApi {
            info,
            servers,
            paths,
            dialect,
        })
    }
}

impl OpenApi {
    /// The base address of the API: the first server (variables set to their
    /// defaults) for OpenAPI 3, or `scheme://host/basePath` for Swagger 2.
    pub fn server_url(&self) -> Option<String> {
        match &self.dialect {
            Dialect::OpenApi3 { .. } => self.servers.first().map(Server::default_url),
            Dialect::Swagger2 {
                host,
                base_path,
                schemes,
                ..
            } => {
                let host = host.as_deref()?;
                let scheme = schemes.first().map(String::as_str).unwrap_or("https");
                let base_path = base_path.as_deref().unwrap_or("").trim_end_matches('/');
                Some(format!("{scheme}://{host}{base_path}"))
            }
        }
    }

    pub fn contact(&self) -> Option<&Contact> {
        self.info.contact.as_ref().filter(|c| !c.is_empty())
    }
}

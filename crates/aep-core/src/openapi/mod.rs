pub mod deref;
pub mod operation;
pub mod response;
pub mod schema;
pub mod server;
pub mod spec;

use std::fs;
use std::path::Path;

use log::debug;
use url::Url;

use crate::error::{LoadError, ParseError};
use spec::{OpenApi, RawDocument};

/// Parse a document from JSON.
pub fn from_json(input: &str) -> Result<OpenApi, ParseError> {
    let raw: RawDocument = serde_json::from_str(input)?;
    OpenApi::try_from(raw)
}

/// Parse a document from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApi, ParseError> {
    let raw: RawDocument = serde_yaml_ng::from_str(input)?;
    OpenApi::try_from(raw)
}

/// Load a document from a local path or an `http(s)://` URL.
///
/// Locations ending in `.yaml`/`.yml` are parsed as YAML, anything else as JSON.
pub fn fetch_openapi(path_or_url: &str) -> Result<OpenApi, LoadError> {
    let body = read_file_or_url(path_or_url)?;
    let doc = if is_yaml_location(path_or_url) {
        from_yaml(&body)?
    } else {
        from_json(&body)?
    };
    Ok(doc)
}

fn read_file_or_url(path_or_url: &str) -> Result<String, LoadError> {
    if is_url(path_or_url) {
        debug!("fetching OpenAPI document from {path_or_url}");
        let fetch_err = |source| LoadError::Fetch {
            url: path_or_url.to_string(),
            source,
        };
        return reqwest::blocking::get(path_or_url)
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(fetch_err);
    }

    debug!("reading OpenAPI document from {path_or_url}");
    fs::read_to_string(path_or_url).map_err(|source| LoadError::Io {
        path: path_or_url.into(),
        source,
    })
}

/// Whether `s` parses as an absolute URL with an `http` or `https` scheme.
pub fn is_url(s: &str) -> bool {
    Url::parse(s).is_ok_and(|u| u.scheme() == "http" || u.scheme() == "https")
}

fn is_yaml_location(location: &str) -> bool {
    let path = match Url::parse(location) {
        Ok(u) if is_url(location) => u.path().to_string(),
        _ => location.to_string(),
    };
    matches!(
        Path::new(&path).extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

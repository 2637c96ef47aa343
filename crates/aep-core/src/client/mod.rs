//! Pattern-driven CRUD client.
//!
//! [`Client`] turns a [`Resource`] and a parameter set into concrete URLs,
//! sends the request through a pluggable [`Transport`], and decodes the
//! JSON object the service answers with.
//!
//! ```no_run
//! use aep_core::api::Resource;
//! use aep_core::client::{Client, ReqwestTransport};
//! use indexmap::IndexMap;
//!
//! let client = Client::new(ReqwestTransport::default());
//! let books = Resource::from_pattern("publishers/{publisher}/books/{book}").unwrap();
//! let mut params = IndexMap::new();
//! params.insert("publisher".to_string(), "my-pub".to_string());
//! let items = client.list(&books, "http://localhost:8081", &params).unwrap();
//! ```

pub mod observer;
pub mod transport;
pub mod unwrap;

pub use observer::{HttpObserver, LogObserver, NoopObserver};
pub use transport::{ReqwestTransport, Transport, TransportError};

use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{Method, Request, Response};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use url::{Url, form_urlencoded};

use crate::api::{Resource, collection_url, resource_url};
use crate::constants::{CONTENT_TYPE_JSON, FIELD_ID_NAME, RESPONSE_ERROR_KEY};
use crate::error::ClientError;

/// An untyped JSON object, as sent and received by the client.
pub type JsonObject = Map<String, Value>;

/// Executes create/list/get/update/delete calls against a resource-oriented API.
///
/// Static headers and the observer are only read during a call, so a shared
/// `&Client` can serve concurrent callers.
pub struct Client<T = ReqwestTransport> {
    transport: T,
    headers: IndexMap<String, String>,
    observer: Box<dyn HttpObserver>,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            headers: IndexMap::new(),
            observer: Box::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: impl HttpObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Headers applied verbatim to every request.
    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut IndexMap<String, String> {
        &mut self.headers
    }

    /// `POST` `body` to the resource's collection.
    ///
    /// When the resource allows user-settable ids and `body` has a string
    /// `id`, the request goes to `<collection>?id=<id>` with the id
    /// form-encoded; `id` stays in the body.
    pub fn create(
        &self,
        resource: &Resource,
        server_url: &str,
        body: &JsonObject,
        parameters: &IndexMap<String, String>,
    ) -> Result<JsonObject, ClientError> {
        let suffix = match body.get(FIELD_ID_NAME) {
            Some(Value::String(id)) if resource.supports_user_settable_create() => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair(FIELD_ID_NAME, id)
                    .finish();
                format!("?{query}")
            }
            _ => String::new(),
        };
        let url = collection_url(resource, server_url, parameters, &suffix)?;
        self.execute(Method::POST, &url, Some(body))
    }

    /// `GET` the resource's collection and return its items.
    pub fn list(
        &self,
        resource: &Resource,
        server_url: &str,
        parameters: &IndexMap<String, String>,
    ) -> Result<Vec<JsonObject>, ClientError> {
        let url = collection_url(resource, server_url, parameters, "")?;
        let data = self.execute(Method::GET, &url, None)?;
        unwrap::list_items(data, &resource.plural)
    }

    /// `GET` a single resource by its full path.
    pub fn get(&self, server_url: &str, path: &str) -> Result<JsonObject, ClientError> {
        self.execute(Method::GET, &resource_url(server_url, path), None)
    }

    /// `PATCH` a single resource by its full path.
    pub fn update(&self, server_url: &str, path: &str, body: &JsonObject) -> Result<(), ClientError> {
        self.execute(Method::PATCH, &resource_url(server_url, path), Some(body))?;
        Ok(())
    }

    /// `DELETE` a single resource by its full path.
    pub fn delete(&self, server_url: &str, path: &str) -> Result<(), ClientError> {
        self.execute(Method::DELETE, &resource_url(server_url, path), None)?;
        Ok(())
    }

    fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&JsonObject>,
    ) -> Result<JsonObject, ClientError> {
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(ClientError::BodySerialization)?;
        let request = self.new_request(method, url, body)?;
        let response = self
            .transport
            .send(request)
            .map_err(ClientError::Transport)?;
        self.parse_response(response)
    }

    fn new_request(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Request<Vec<u8>>, ClientError> {
        // Percent-encodes characters `http::Uri` rejects, e.g. spaces in ids.
        let url = Url::parse(url)?;
        let has_body = body.is_some();
        let mut request = Request::builder()
            .method(method)
            .uri(url.as_str())
            .body(body.unwrap_or_default())?;

        let headers = request.headers_mut();
        if has_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        }
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(http::Error::from)?;
            let value = HeaderValue::from_str(value).map_err(http::Error::from)?;
            headers.insert(name, value);
        }

        self.observer.on_request(&request);
        Ok(request)
    }

    /// Decode a response body. An empty body is an empty object; an object
    /// with an `error` key is an API failure whatever the status code.
    fn parse_response(&self, response: Response<Vec<u8>>) -> Result<JsonObject, ClientError> {
        self.observer.on_response(&response);

        let body = response.into_body();
        if body.is_empty() {
            return Ok(JsonObject::new());
        }

        let data: JsonObject = serde_json::from_slice(&body).map_err(ClientError::Decode)?;
        if let Some(err) = data.get(RESPONSE_ERROR_KEY) {
            return Err(ClientError::Api(err.clone()));
        }
        Ok(data)
    }
}

impl Default for Client<ReqwestTransport> {
    fn default() -> Self {
        Self::new(ReqwestTransport::default())
    }
}

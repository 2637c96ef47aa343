use http::{Request, Response};
use log::{debug, trace};

/// Hooks invoked with every outgoing request and incoming response.
///
/// Observers only see shared references and cannot change what the client
/// does. Both hooks default to doing nothing.
pub trait HttpObserver: Send + Sync {
    fn on_request(&self, _request: &Request<Vec<u8>>) {}

    fn on_response(&self, _response: &Response<Vec<u8>>) {}
}

/// The default observer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl HttpObserver for NoopObserver {}

/// Logs requests and responses through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl HttpObserver for LogObserver {
    fn on_request(&self, request: &Request<Vec<u8>>) {
        debug!("--> {} {}", request.method(), request.uri());
        if !request.body().is_empty() {
            trace!("request body: {}", String::from_utf8_lossy(request.body()));
        }
    }

    fn on_response(&self, response: &Response<Vec<u8>>) {
        debug!(
            "<-- {} ({} bytes)",
            response.status(),
            response.body().len()
        );
        if !response.body().is_empty() {
            trace!("response body: {}", String::from_utf8_lossy(response.body()));
        }
    }
}

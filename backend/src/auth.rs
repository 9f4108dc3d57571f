use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorForbidden,
    Error,
};
use futures_util::future::{ready, Ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Rejects requests whose `X-API-KEY` header does not match the configured key.
pub struct ApiKeyMiddleware {
    pub api_key: Arc<String>,
}

impl ApiKeyMiddleware {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Arc::new(api_key.into()),
        }
    }
}

/// Constant-time comparison so the key cannot be guessed byte by byte.
fn keys_match(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        return false;
    }
    provided
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = ApiKeyMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyMiddlewareService {
            service: Rc::new(service),
            api_key: self.api_key.clone(),
        }))
    }
}

pub struct ApiKeyMiddlewareService<S> {
    service: Rc<S>,
    api_key: Arc<String>,
}

impl<S, B> Service<ServiceRequest> for ApiKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let api_key = self.api_key.clone();
        let path = req.path().to_string();
        let method = req.method().to_string();

        Box::pin(async move {
            let provided = req
                .headers()
                .get(API_KEY_HEADER)
                .and_then(|value| value.to_str().ok());

            match provided {
                Some(key) if keys_match(key, &api_key) => {
                    log::debug!("API key accepted for {} {}", method, path);
                    service.call(req).await
                }
                Some(_) => {
                    log::warn!("Rejected {} {}: invalid API key", method, path);
                    Err(ErrorForbidden("Could not validate credentials"))
                }
                None => {
                    log::warn!("Rejected {} {}: missing {} header", method, path, API_KEY_HEADER);
                    Err(ErrorForbidden("Could not validate credentials"))
                }
            }
        })
    }
}

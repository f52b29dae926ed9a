//! Request-scoped context middleware
//!
//! Extracts the per-request identifying fields (correlation id, auth token,
//! user id, organization id) from the `tmx-*` headers into a
//! [`RequestContext`] stored in the request extensions, and echoes the
//! correlation id back on the response.
//!
//! ## Design
//! - If the request has a `tmx-correlation-id` header: use it
//! - Otherwise: generate a UUID v4
//! - The auth token comes from `tmx-auth-token`, falling back to the
//!   standard `Authorization` header
//! - Handlers receive the context as an extractor and pass it on explicitly;
//!   work submitted to the bulkhead's worker pool does not inherit it, so
//!   the service layer clones it into every isolated task

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use uuid::Uuid;

pub const CORRELATION_ID_HEADER: &str = "tmx-correlation-id";
pub const AUTH_TOKEN_HEADER: &str = "tmx-auth-token";
pub const USER_ID_HEADER: &str = "tmx-user-id";
pub const ORGANIZATION_ID_HEADER: &str = "tmx-org-id";

/// Per-request identifying fields, all defaulting to empty strings.
/// Created once per inbound request, dropped when the request completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub correlation_id: String,
    pub auth_token: String,
    pub user_id: String,
    pub organization_id: String,
}

fn header_string(req: &ServiceRequest, name: &str) -> String {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Middleware that populates the [`RequestContext`] for every request
#[derive(Clone)]
pub struct RequestContextMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestContextMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestContextMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestContextMiddlewareService { service }))
    }
}

pub struct RequestContextMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestContextMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let mut correlation_id = header_string(&req, CORRELATION_ID_HEADER);
        if correlation_id.is_empty() {
            correlation_id = Uuid::new_v4().to_string();
        }

        let mut auth_token = header_string(&req, AUTH_TOKEN_HEADER);
        if auth_token.is_empty() {
            auth_token = header_string(&req, "authorization");
        }

        let context = RequestContext {
            correlation_id: correlation_id.clone(),
            auth_token,
            user_id: header_string(&req, USER_ID_HEADER),
            organization_id: header_string(&req, ORGANIZATION_ID_HEADER),
        };

        req.extensions_mut().insert(context);

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            if let Ok(value) = HeaderValue::from_str(&correlation_id) {
                res.headers_mut()
                    .insert(HeaderName::from_static(CORRELATION_ID_HEADER), value);
            }
            Ok(res)
        })
    }
}

impl FromRequest for RequestContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Ok(req
            .extensions()
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    async fn echo_context(ctx: RequestContext) -> HttpResponse {
        HttpResponse::Ok().json(serde_json::json!({
            "correlationId": ctx.correlation_id,
            "authToken": ctx.auth_token,
            "userId": ctx.user_id,
            "organizationId": ctx.organization_id,
        }))
    }

    #[actix_web::test]
    async fn populates_context_from_headers() {
        let app = test::init_service(
            App::new()
                .wrap(RequestContextMiddleware)
                .route("/ctx", web::get().to(echo_context)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/ctx")
            .insert_header((CORRELATION_ID_HEADER, "corr-1"))
            .insert_header((AUTH_TOKEN_HEADER, "token-1"))
            .insert_header((USER_ID_HEADER, "user-1"))
            .insert_header((ORGANIZATION_ID_HEADER, "org-1"))
            .to_request();

        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["correlationId"], "corr-1");
        assert_eq!(body["authToken"], "token-1");
        assert_eq!(body["userId"], "user-1");
        assert_eq!(body["organizationId"], "org-1");
    }

    #[actix_web::test]
    async fn generates_correlation_id_when_absent() {
        let app = test::init_service(
            App::new()
                .wrap(RequestContextMiddleware)
                .route("/ctx", web::get().to(echo_context)),
        )
        .await;

        let req = test::TestRequest::get().uri("/ctx").to_request();
        let res = test::call_service(&app, req).await;

        let echoed = res
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap()
            .to_string();
        assert_eq!(echoed.len(), 36); // UUID v4 string length

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["correlationId"], echoed.as_str());
    }

    #[actix_web::test]
    async fn authorization_header_feeds_auth_token() {
        let app = test::init_service(
            App::new()
                .wrap(RequestContextMiddleware)
                .route("/ctx", web::get().to(echo_context)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/ctx")
            .insert_header(("authorization", "Bearer abc"))
            .to_request();

        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["authToken"], "Bearer abc");
    }
}

//! Body, query and path extractors that fail with the JSON error envelope
//! instead of ntex's plain-text 400.

use std::ops::Deref;

use ntex::{
    http::Payload,
    web::{self, ErrorRenderer, FromRequest, HttpRequest},
};
use serde::de::DeserializeOwned;

use crate::front::errors;

fn invalid_input(part: &str, err: impl std::fmt::Display) -> web::Error {
    errors::UserError::InvalidInput(format!("invalid {part}: {err}")).into()
}

/// JSON request body
#[derive(Debug)]
pub struct ApiJson<T> {
    inner: T,
}

/// Query string
#[derive(Debug)]
pub struct ApiQuery<T> {
    inner: T,
}

/// Path segments, e.g. `(i64,)` for `/{id}`
#[derive(Debug)]
pub struct ApiPath<T> {
    inner: T,
}

macro_rules! impl_inner {
    ($($wrapper:ident),+) => {$(
        impl<T> $wrapper<T> {
            pub fn into_inner(self) -> T {
                self.inner
            }
        }

        impl<T> Deref for $wrapper<T> {
            type Target = T;

            fn deref(&self) -> &T {
                &self.inner
            }
        }
    )+};
}

impl_inner!(ApiJson, ApiQuery, ApiPath);

impl<T, Err> FromRequest<Err> for ApiJson<T>
where
    T: DeserializeOwned + 'static,
    Err: ErrorRenderer,
{
    type Error = web::Error;

    async fn from_request(req: &HttpRequest, payload: &mut Payload) -> Result<Self, Self::Error> {
        <web::types::Json<T> as FromRequest<Err>>::from_request(req, payload)
            .await
            .map(|json| Self {
                inner: json.into_inner(),
            })
            .map_err(|e| invalid_input("request body", e))
    }
}

impl<T, Err> FromRequest<Err> for ApiQuery<T>
where
    T: DeserializeOwned + 'static,
    Err: ErrorRenderer,
{
    type Error = web::Error;

    async fn from_request(req: &HttpRequest, payload: &mut Payload) -> Result<Self, Self::Error> {
        <web::types::Query<T> as FromRequest<Err>>::from_request(req, payload)
            .await
            .map(|query| Self {
                inner: query.into_inner(),
            })
            .map_err(|e| invalid_input("query string", e))
    }
}

impl<T, Err> FromRequest<Err> for ApiPath<T>
where
    T: DeserializeOwned + 'static,
    Err: ErrorRenderer,
{
    type Error = web::Error;

    async fn from_request(req: &HttpRequest, payload: &mut Payload) -> Result<Self, Self::Error> {
        <web::types::Path<T> as FromRequest<Err>>::from_request(req, payload)
            .await
            .map(|path| Self {
                inner: path.into_inner(),
            })
            .map_err(|e| invalid_input("path", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api, front::response};
    use ntex::{http::StatusCode, web::test};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct PageQuery {
        limit: i64,
    }

    #[web::post("/register")]
    async fn register(
        body: ApiJson<api::user::RegisterRequest>,
    ) -> Result<impl web::Responder, web::Error> {
        Ok(response::ok(body.into_inner().email))
    }

    #[web::get("/items/{id}")]
    async fn item(
        path: ApiPath<(i64,)>,
        query: ApiQuery<PageQuery>,
    ) -> Result<impl web::Responder, web::Error> {
        Ok(response::ok((path.0, query.limit)))
    }

    async fn body_json(resp: web::WebResponse) -> serde_json::Value {
        serde_json::from_slice(&test::read_body(resp).await).unwrap()
    }

    #[ntex::test]
    async fn test_malformed_body_uses_error_envelope() {
        let app = test::init_service(web::App::new().service(register)).await;

        let req = test::TestRequest::post()
            .uri("/register")
            .header("content-type", "application/json")
            .set_payload(r#"{"name":"Ana","email":"ana@x.com","password":"Secret123!"}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("invalid request body"));

        let req = test::TestRequest::post()
            .uri("/register")
            .header("content-type", "application/json")
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["success"], false);
    }

    #[ntex::test]
    async fn test_bad_query_and_path_use_error_envelope() {
        let app = test::init_service(web::App::new().service(item)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/items/4?limit=10").to_request(),
        )
        .await;
        assert!(resp.status().is_success());
        assert_eq!(body_json(resp).await["data"], serde_json::json!([4, 10]));

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/items/4?limit=ten").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("invalid query string"));

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/items/four?limit=10").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("invalid path"));
    }
}

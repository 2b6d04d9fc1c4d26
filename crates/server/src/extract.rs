//! Extractors whose rejections answer with the JSON error envelope instead
//! of axum's plain-text bodies.

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::{request::Parts, StatusCode},
    Json,
};

use crate::errors::JsonApiError;

pub struct ApiJson<T>(pub T);

pub struct ApiPath<T>(pub T);

pub struct ApiQuery<T>(pub T);

fn bad_request(detail: String) -> JsonApiError {
    JsonApiError::new(StatusCode::BAD_REQUEST, "Bad Request", Some(detail))
}

impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for JsonApiError {
    fn from(rejection: PathRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for JsonApiError {
    fn from(rejection: QueryRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Priced {
        #[allow(dead_code)]
        price: f64,
    }

    #[tokio::test]
    async fn missing_field_is_a_bad_request() {
        let req = HttpRequest::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"title":"no price"}"#))
            .unwrap();
        let Err(err) = ApiJson::<Priced>::from_request(req, &()).await else {
            panic!("expected rejection")
        };
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.detail.unwrap_or_default().contains("price"));
    }

    #[tokio::test]
    async fn malformed_query_is_a_bad_request() {
        #[derive(Debug, Deserialize)]
        struct Limit {
            #[allow(dead_code)]
            limit: usize,
        }
        let req = HttpRequest::builder().uri("/x?limit=many").body(()).unwrap();
        let (mut parts, _) = req.into_parts();
        let Err(err) = ApiQuery::<Limit>::from_request_parts(&mut parts, &()).await else {
            panic!("expected rejection")
        };
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.title, "Bad Request");
    }
}

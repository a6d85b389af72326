//! Shared fixtures for integration tests.

use axum::{
    body::{Body, Bytes},
    extract::Json,
    http::{request::Builder, Request},
    response::Response,
    routing::get as route_get,
    Router,
};
use request_pipeline::http::{ListQuery, ListResponse, RequestContext, SortOrder};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub id: u32,
    pub name: String,
}

/// 101 items named `item-000` .. `item-100`.
pub fn catalog() -> Vec<Item> {
    (0..101)
        .map(|id| Item {
            id,
            name: format!("item-{:03}", id),
        })
        .collect()
}

async fn list_items(query: ListQuery) -> ListResponse<Item> {
    let mut items = catalog();
    if let Some(field) = query.sorting.fields.first() {
        if field.name == "id" && field.order == SortOrder::Desc {
            items.reverse();
        }
    }

    let page = query.pagination_or_default();
    let total = items.len() as u64;
    let page_items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.page_size as usize)
        .collect();
    ListResponse::new(page_items, total, page.page_size)
}

async fn echo_context(context: RequestContext) -> Json<RequestContext> {
    Json(context)
}

async fn reflect(body: Bytes) -> Bytes {
    body
}

/// Application routes exercised by the tests.
pub fn test_routes() -> Router {
    Router::new()
        .route("/items", route_get(list_items))
        .route("/context", route_get(echo_context))
        .route("/reflect", route_get(reflect).post(reflect))
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Builder {
    Request::builder().method("GET").uri(uri)
}

#[allow(dead_code)]
pub fn empty(builder: Builder) -> Request<Body> {
    builder.body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

//! Pagination and sorting query protocol.
//!
//! # Query parameters
//! - `pageSize`, `pageNumber`: both or neither; exactly one is a client error
//! - `sort`: comma-separated fields, `-` prefix for descending, `+` or none for ascending
//!
//! # Response metadata
//! - `X-Resource-Count`: total matching items
//! - `X-Page-Count`: `ceil(totalCount / pageSize)`, `0` when `pageSize` is `0`

use axum::{
    extract::{FromRequestParts, Query},
    http::{request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::PaginationError;
use crate::http::headers::{X_PAGE_COUNT, X_RESOURCE_COUNT};

pub const PAGE_SIZE_PARAM: &str = "pageSize";
pub const PAGE_NUMBER_PARAM: &str = "pageNumber";
pub const SORT_PARAM: &str = "sort";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page_size: u32,
    pub page_number: u32,
}

impl Pagination {
    pub fn new(page_size: u32, page_number: u32) -> Self {
        Self {
            page_size,
            page_number,
        }
    }

    /// Number of items preceding this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number.saturating_sub(1)) * u64::from(self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(100, 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortingField {
    pub name: String,
    pub order: SortOrder,
}

impl SortingField {
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order: SortOrder::Desc,
        }
    }
}

/// Sort fields in precedence order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sorting {
    pub fields: Vec<SortingField>,
}

impl Sorting {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Decode the pagination pair.
///
/// `Ok(None)` means neither parameter was supplied and the caller should use
/// its default (see `Pagination::default`).
pub fn decode_pagination(
    page_size: Option<u32>,
    page_number: Option<u32>,
) -> Result<Option<Pagination>, PaginationError> {
    match (page_size, page_number) {
        (Some(size), Some(number)) => Ok(Some(Pagination::new(size, number))),
        (None, None) => Ok(None),
        _ => Err(PaginationError::Incompatible),
    }
}

pub fn decode_sorting(sort: Option<&str>) -> Sorting {
    let Some(sort) = sort else {
        return Sorting::default();
    };

    let fields = sort
        .split(',')
        .filter(|token| !token.is_empty())
        .filter_map(|token| {
            let field = if let Some(name) = token.strip_prefix('-') {
                SortingField::desc(name)
            } else {
                SortingField::asc(token.strip_prefix('+').unwrap_or(token))
            };
            // A bare sign names no field.
            (!field.name.is_empty()).then_some(field)
        })
        .collect();

    Sorting { fields }
}

pub fn encode_pagination_query(pagination: &Pagination) -> Vec<(&'static str, String)> {
    vec![
        (PAGE_NUMBER_PARAM, pagination.page_number.to_string()),
        (PAGE_SIZE_PARAM, pagination.page_size.to_string()),
    ]
}

pub fn encode_sorting_query(sorting: &Sorting) -> (&'static str, String) {
    let encoded = sorting
        .fields
        .iter()
        .map(|field| match field.order {
            // A leading sign would otherwise be read as the direction.
            SortOrder::Asc if field.name.starts_with(['+', '-']) => format!("+{}", field.name),
            SortOrder::Asc => field.name.clone(),
            SortOrder::Desc => format!("-{}", field.name),
        })
        .collect::<Vec<_>>()
        .join(",");
    (SORT_PARAM, encoded)
}

pub fn page_count(total_count: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(u64::from(page_size))
}

#[derive(Debug, Deserialize)]
struct RawListQuery {
    #[serde(rename = "pageSize")]
    page_size: Option<u32>,
    #[serde(rename = "pageNumber")]
    page_number: Option<u32>,
    sort: Option<String>,
}

/// Decoded pagination and sorting for a list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// `None` when the client sent neither pagination parameter.
    pub pagination: Option<Pagination>,
    pub sorting: Sorting,
}

impl ListQuery {
    pub fn pagination_or_default(&self) -> Pagination {
        self.pagination.unwrap_or_default()
    }
}

/// Rejection for `ListQuery`.
#[derive(Debug)]
pub enum ListQueryRejection {
    Pagination(PaginationError),
    Query(String),
}

impl IntoResponse for ListQueryRejection {
    fn into_response(self) -> Response {
        match self {
            ListQueryRejection::Pagination(e) => e.into_response(),
            ListQueryRejection::Query(message) => (StatusCode::BAD_REQUEST, message).into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = ListQueryRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<RawListQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ListQueryRejection::Query(e.body_text()))?;

        let pagination = decode_pagination(raw.page_size, raw.page_number).map_err(|e| {
            tracing::debug!(
                page_size = ?raw.page_size,
                page_number = ?raw.page_number,
                "Rejecting incompatible pagination parameters"
            );
            ListQueryRejection::Pagination(e)
        })?;

        Ok(Self {
            pagination,
            sorting: decode_sorting(raw.sort.as_deref()),
        })
    }
}

/// A page of results plus the metadata needed for the count headers.
#[derive(Debug, Clone)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_size: u32,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>, total_count: u64, page_size: u32) -> Self {
        Self {
            items,
            total_count,
            page_size,
        }
    }

    pub fn page_count(&self) -> u64 {
        page_count(self.total_count, self.page_size)
    }
}

impl<T> IntoResponse for ListResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let total = HeaderValue::from(self.total_count);
        let pages = HeaderValue::from(self.page_count());
        let mut response = Json(self.items).into_response();
        let headers = response.headers_mut();
        headers.insert(X_RESOURCE_COUNT, total);
        headers.insert(X_PAGE_COUNT, pages);
        response
    }
}

//! Page-number pagination for list endpoints
//!
//! Pages are 1-based. The page size defaults to [`DEFAULT_PAGE_SIZE`] and is
//! clamped to [`MAX_PAGE_SIZE`] whatever the client asks for. Responses use the
//! envelope `{"links": {"next", "previous"}, "count", "result"}`.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{HeaderMap, Uri, header, request::Parts},
};
use percent_encoding::percent_decode_str;
use serde::Serialize;

use super::error::ApiError;
use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::store::Window;

const PAGE_PARAM: &str = "page";
const LAST_PAGE: &str = "last";

fn invalid_page() -> ApiError {
    ApiError::NotFound("Invalid page.".to_string())
}

/// Number of pages for `total` items; an empty set still has one page
pub fn num_pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 {
        return 1;
    }
    (total + page_size - 1) / page_size
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
    /// `page=last` was asked for; `page` is meaningless until [`PageRequest::at_last_page`]
    pub last: bool,
}

impl PageRequest {
    /// Parse raw `page` / `page_size` parameters.
    /// A malformed page is an error; a malformed page size falls back to the default.
    pub fn parse(page: Option<&str>, page_size: Option<&str>) -> Result<Self, ApiError> {
        let (page, last) = match page.map(str::trim) {
            None | Some("") => (1, false),
            Some(LAST_PAGE) => (1, true),
            Some(raw) => {
                let page = raw
                    .parse::<i64>()
                    .ok()
                    .filter(|p| *p >= 1)
                    .ok_or_else(invalid_page)?;
                (page, false)
            }
        };

        let page_size = page_size
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|size| *size > 0)
            .map(|size| size.min(MAX_PAGE_SIZE))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Ok(Self {
            page,
            page_size,
            last,
        })
    }

    /// Point the request at the final page of `total` items
    pub fn at_last_page(self, total: i64) -> Self {
        Self {
            page: num_pages(total, self.page_size),
            last: false,
            ..self
        }
    }

    pub fn window(&self) -> Window {
        Window {
            limit: self.page_size,
            offset: (self.page - 1).saturating_mul(self.page_size),
        }
    }

    /// Wrap one page of results, rejecting pages past the end
    pub fn into_page<T>(
        self,
        total: i64,
        result: Vec<T>,
        links: &PageLinkBase,
    ) -> Result<Page<T>, ApiError> {
        let last = num_pages(total, self.page_size);
        if self.page > last {
            return Err(invalid_page());
        }

        Ok(Page {
            links: PageLinks {
                next: (self.page < last).then(|| links.page_url(self.page + 1)),
                previous: (self.page > 1).then(|| links.page_url(self.page - 1)),
            },
            count: total,
            result,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub next: Option<String>,
    pub previous: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub links: PageLinks,
    pub count: i64,
    pub result: Vec<T>,
}

/// The request URL that page links are derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLinkBase {
    origin: Option<String>,
    path: String,
    query: Option<String>,
}

impl PageLinkBase {
    pub fn new(uri: &Uri, headers: &HeaderMap) -> Self {
        let origin = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .filter(|host| !host.is_empty())
            .map(|host| {
                let scheme = match headers
                    .get("x-forwarded-proto")
                    .and_then(|v| v.to_str().ok())
                {
                    Some("https") => "https",
                    _ => "http",
                };
                format!("{scheme}://{host}")
            });

        Self {
            origin,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
        }
    }

    /// Same URL with `page` replaced; page 1 drops the parameter entirely
    pub fn page_url(&self, page: i64) -> String {
        let mut pairs: Vec<String> = self
            .query
            .as_deref()
            .unwrap_or("")
            .split('&')
            .filter(|pair| !pair.is_empty() && !is_page_param(pair))
            .map(str::to_string)
            .collect();
        if page > 1 {
            pairs.push(format!("{PAGE_PARAM}={page}"));
        }

        let mut url = format!("{}{}", self.origin.as_deref().unwrap_or(""), self.path);
        if !pairs.is_empty() {
            url.push('?');
            url.push_str(&pairs.join("&"));
        }
        url
    }
}

fn is_page_param(pair: &str) -> bool {
    let key = pair.split('=').next().unwrap_or("").replace('+', " ");
    percent_decode_str(&key).decode_utf8_lossy() == PAGE_PARAM
}

impl<S> FromRequestParts<S> for PageLinkBase
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Nested routers strip their prefix from `parts.uri`; links need the full path
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|OriginalUri(uri)| uri.clone())
            .unwrap_or_else(|| parts.uri.clone());
        Ok(PageLinkBase::new(&uri, &parts.headers))
    }
}

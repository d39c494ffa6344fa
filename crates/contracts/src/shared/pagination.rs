//! Pagination types and the boundary adapter for list responses.
//!
//! The canonical wire form is
//! `{ "data": [...], "meta": { "current_page", "last_page", "per_page", "total", "from", "to" }, "links": {...} }`.
//! [`normalize_page`] also accepts the other shapes list endpoints have been
//! seen to return (`items` instead of `data`, `pagination` instead of
//! `meta`, camelCase keys, top-level counters) so call sites never read raw
//! responses.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const DEFAULT_PER_PAGE: u64 = 10;

const ITEMS_KEYS: &[&str] = &["items", "data"];
const META_KEYS: &[&str] = &["meta", "pagination"];
const CURRENT_PAGE_KEYS: &[&str] = &["current_page", "page", "currentPage"];
const LAST_PAGE_KEYS: &[&str] = &["last_page", "lastPage", "total_pages", "totalPages"];
const PER_PAGE_KEYS: &[&str] = &["per_page", "perPage", "page_size", "pageSize"];
const TOTAL_KEYS: &[&str] = &["total", "total_count", "totalCount"];

// ============================================================================
// Page
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u64,
    pub last_page: u64,
    pub per_page: u64,
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<u64>,
}

impl PageMeta {
    /// Metadata for `total` records split by `per_page`, with the requested
    /// page clamped into `[1, last_page]`.
    pub fn compute(total: u64, per_page: u64, requested_page: u64) -> Self {
        let per_page = per_page.max(1);
        let last_page = total.div_ceil(per_page).max(1);
        let current_page = requested_page.clamp(1, last_page);
        let (from, to) = if total == 0 {
            (None, None)
        } else {
            let from = (current_page - 1).saturating_mul(per_page).saturating_add(1);
            (Some(from), Some(current_page.saturating_mul(per_page).min(total)))
        };
        Self {
            current_page,
            last_page,
            per_page,
            total,
            from,
            to,
        }
    }

    /// Offset of the first record of the current page
    pub fn offset(&self) -> u64 {
        self.current_page.saturating_sub(1).saturating_mul(self.per_page)
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Ordered slice of records plus pagination metadata.
///
/// A page is always replaced as a whole, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(rename = "data")]
    pub items: Vec<T>,
    pub meta: PageMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<PageLinks>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, meta: PageMeta) -> Self {
        Self {
            items,
            meta,
            links: None,
        }
    }

    pub fn empty(per_page: u64) -> Self {
        Self::new(Vec::new(), PageMeta::compute(0, per_page, 1))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Page<Value> {
    pub fn decode_items<T: DeserializeOwned>(self) -> Result<Page<T>, ShapeError> {
        let items = self
            .items
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(|e| ShapeError::Item(e.to_string())))
            .collect::<Result<Vec<T>, _>>()?;
        Ok(Page {
            items,
            meta: self.meta,
            links: self.links,
        })
    }
}

// ============================================================================
// Query
// ============================================================================

/// Parameters of a list request (`page` is 1-based)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u64,
    pub per_page: u64,
    pub filters: BTreeMap<String, String>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

impl PageQuery {
    pub fn new(per_page: u64) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
            filters: BTreeMap::new(),
        }
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Flat query parameters: `page`, `per_page` and every filter
    pub fn to_params(&self) -> BTreeMap<String, String> {
        let mut params = self.filters.clone();
        params.insert("page".to_string(), self.page.to_string());
        params.insert("per_page".to_string(), self.per_page.to_string());
        params
    }

    /// Parse query parameters; blank filters are dropped and malformed
    /// numbers fall back to defaults.
    pub fn from_params(mut params: BTreeMap<String, String>, default_per_page: u64) -> Self {
        let page = params
            .remove("page")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(1)
            .max(1);
        let per_page = params
            .remove("per_page")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(default_per_page)
            .max(1);
        params.retain(|_, v| !v.trim().is_empty());
        Self {
            page,
            per_page,
            filters: params,
        }
    }
}

// ============================================================================
// Normalization
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("list response is neither an object nor an array")]
    NotAnObject,
    #[error("list response has no `items` or `data` array")]
    MissingItems,
    #[error("failed to decode list item: {0}")]
    Item(String),
}

/// Normalize any known list response shape into a canonical [`Page`].
///
/// Missing counters are derived from what is present: `total` defaults to
/// the item count, `last_page` to `ceil(total / per_page)`. `current_page`
/// always ends up in `[1, last_page]`.
pub fn normalize_page(value: Value) -> Result<Page<Value>, ShapeError> {
    let mut root = match value {
        Value::Array(items) => {
            let count = items.len() as u64;
            let meta = PageMeta::compute(count, count.max(1), 1);
            return Ok(Page::new(items, meta));
        }
        Value::Object(map) => map,
        _ => return Err(ShapeError::NotAnObject),
    };

    let items = take_first_array(&mut root, ITEMS_KEYS).ok_or(ShapeError::MissingItems)?;
    let nested = META_KEYS
        .iter()
        .find_map(|k| root.get(*k).and_then(Value::as_object).cloned())
        .unwrap_or_default();
    let sources = [&nested, &root];

    let count = items.len() as u64;
    let per_page = read_u64(&sources, PER_PAGE_KEYS)
        .filter(|p| *p > 0)
        .unwrap_or_else(|| count.max(1));
    let total = read_u64(&sources, TOTAL_KEYS).unwrap_or(count);
    let last_page = read_u64(&sources, LAST_PAGE_KEYS)
        .unwrap_or_else(|| total.div_ceil(per_page))
        .max(1);
    let current_page = read_u64(&sources, CURRENT_PAGE_KEYS)
        .unwrap_or(1)
        .clamp(1, last_page);

    let computed = PageMeta::compute(total, per_page, current_page);
    let from = read_u64(&sources, &["from"]).or(computed.from);
    let to = read_u64(&sources, &["to"]).or(computed.to);

    let links = root
        .get("links")
        .and_then(Value::as_object)
        .map(|l| PageLinks {
            first: read_string(l, "first"),
            last: read_string(l, "last"),
            prev: read_string(l, "prev"),
            next: read_string(l, "next"),
        });

    Ok(Page {
        items,
        meta: PageMeta {
            current_page,
            last_page,
            per_page,
            total,
            from,
            to,
        },
        links,
    })
}

fn take_first_array(root: &mut Map<String, Value>, keys: &[&str]) -> Option<Vec<Value>> {
    let key = keys.iter().find(|k| root.get(**k).is_some_and(Value::is_array))?;
    match root.remove(*key) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    }
}

fn read_u64(sources: &[&Map<String, Value>], keys: &[&str]) -> Option<u64> {
    sources
        .iter()
        .find_map(|src| keys.iter().find_map(|k| src.get(*k).and_then(lenient_u64)))
}

fn lenient_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn read_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

use std::cmp::Ordering;

use serde::Serialize;

use super::criteria::{PageRequest, QueryCriteria, SortKey};
use crate::board::error::ValidationError;

/// A record type the query engine can search, filter and sort.
pub trait Queryable {
    type Sort: SortKey;

    /// Names accepted as equality filters.
    const FILTERS: &'static [&'static str];

    /// Text fields checked by the free-text search.
    fn search_fields(&self) -> Vec<&str>;

    /// Stored value of a filterable field; `None` never matches a constraint.
    fn filter_value(&self, name: &str) -> Option<&str>;

    fn compare(&self, other: &Self, sort: Self::Sort) -> Ordering;
}

/// Filtered, sorted and optionally paginated view over a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPage<R> {
    pub items: Vec<R>,
    pub total: usize,
    pub total_pages: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl<R> QueryPage<R> {
    pub fn map<T>(self, f: impl FnMut(R) -> T) -> QueryPage<T> {
        QueryPage {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            total_pages: self.total_pages,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Applies search, filters, a stable sort and pagination to `records`.
///
/// A record is kept when the search needle is blank or appears (case-insensitively) in any of
/// its search fields, and every active filter equals the record's stored value. Unknown filter
/// names are rejected rather than ignored.
pub fn filter_sort<R>(
    records: &[R],
    criteria: &QueryCriteria<R::Sort>,
) -> Result<QueryPage<R>, ValidationError>
where
    R: Queryable + Clone,
{
    let filters = criteria.active_filters(R::FILTERS)?;
    let needle = criteria.needle();

    let mut matched: Vec<R> = records
        .iter()
        .filter(|record| matches_search(*record, needle.as_deref()))
        .filter(|record| {
            filters
                .iter()
                .all(|(name, value)| record.filter_value(name) == Some(*value))
        })
        .cloned()
        .collect();

    matched.sort_by(|a, b| a.compare(b, criteria.sort));

    Ok(paginate(matched, criteria.page_request()))
}

fn matches_search<R: Queryable>(record: &R, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => record
            .search_fields()
            .into_iter()
            .any(|field| field.to_lowercase().contains(needle)),
    }
}

fn paginate<R>(matched: Vec<R>, page: Option<PageRequest>) -> QueryPage<R> {
    let total = matched.len();
    match page {
        Some(request) => {
            let page_size = request.page_size() as usize;
            let items = matched
                .into_iter()
                .skip(request.offset())
                .take(page_size)
                .collect();
            QueryPage {
                items,
                total,
                total_pages: total.div_ceil(page_size),
                page: Some(request.page()),
                page_size: Some(request.page_size()),
            }
        }
        None => QueryPage {
            items: matched,
            total,
            total_pages: usize::from(total > 0),
            page: None,
            page_size: None,
        },
    }
}

/// Locale-style ordering: case-folded comparison first, raw text as the tie-break.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

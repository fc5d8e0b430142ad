use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::board::error::ValidationError;

/// Filter value meaning "no constraint".
pub const ALL: &str = "all";

/// Page size used when a caller asks for a page without naming a size and the listing has no
/// configured size of its own.
pub const DEFAULT_PAGE_SIZE: u32 = 9;

/// A fixed, per-entity enumeration of sort orders.
pub trait SortKey: Copy + Default + fmt::Debug + FromStr<Err = ValidationError> {
    fn as_str(self) -> &'static str;
}

/// 1-indexed page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Result<Self, ValidationError> {
        if page_size == 0 {
            return Err(ValidationError::InvalidPageSize);
        }
        if page == 0 {
            return Err(ValidationError::InvalidPage);
        }
        Ok(Self { page, page_size })
    }

    pub fn first(page_size: u32) -> Result<Self, ValidationError> {
        Self::new(1, page_size)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub(crate) fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.page_size as usize)
    }
}

/// Search, filter, sort and pagination parameters for one listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCriteria<S> {
    pub search: Option<String>,
    pub filters: BTreeMap<String, String>,
    pub sort: S,
    pub page: Option<PageRequest>,
    /// Page number asked for without a size; the listing's page size completes it.
    pub requested_page: Option<u32>,
}

impl<S: SortKey> Default for QueryCriteria<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: SortKey> QueryCriteria<S> {
    pub fn new(sort: S) -> Self {
        Self {
            search: None,
            filters: BTreeMap::new(),
            sort,
            page: None,
            requested_page: None,
        }
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    pub fn paginate(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }

    /// Completes the page window with `page_size` rows when no size was requested, starting at
    /// the first page unless a page number was given.
    pub fn with_default_page(mut self, page_size: u32) -> Result<Self, ValidationError> {
        if self.page.is_none() {
            let page = self.requested_page.take().unwrap_or(1);
            self.page = Some(PageRequest::new(page, page_size)?);
        }
        Ok(self)
    }

    /// Effective page window; a bare page number uses [`DEFAULT_PAGE_SIZE`].
    pub fn page_request(&self) -> Option<PageRequest> {
        self.page.or_else(|| {
            self.requested_page.map(|page| PageRequest {
                page,
                page_size: DEFAULT_PAGE_SIZE,
            })
        })
    }

    /// Builds criteria from flat key/value pairs such as a URL query string.
    ///
    /// `search` (or `q`), `sort`, `page` and `page_size` are reserved; every other key is an
    /// equality filter, compared verbatim. Blank values are treated as absent. A `page` without
    /// `page_size` is kept as [`QueryCriteria::requested_page`] so the listing can apply its own
    /// size.
    pub fn from_params<I, K, V>(params: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut criteria = Self::default();
        let mut page = None;
        let mut page_size = None;

        for (key, value) in params {
            let value = value.as_ref();
            if value.trim().is_empty() {
                continue;
            }

            match key.as_ref() {
                "search" | "q" => criteria.search = Some(value.to_string()),
                "sort" => criteria.sort = value.trim().parse()?,
                "page" => page = Some(parse_number("page", value.trim())?),
                "page_size" => page_size = Some(parse_number("page_size", value.trim())?),
                name => {
                    criteria.filters.insert(name.to_string(), value.to_string());
                }
            }
        }

        match (page, page_size) {
            (page, Some(page_size)) => {
                criteria.page = Some(PageRequest::new(page.unwrap_or(1), page_size)?);
            }
            (Some(0), None) => return Err(ValidationError::InvalidPage),
            (page, None) => criteria.requested_page = page,
        }

        Ok(criteria)
    }

    /// Lower-cased search needle, or `None` when the search is blank. Surrounding whitespace
    /// is part of the needle.
    pub(crate) fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .map(str::to_lowercase)
    }

    /// Filters that constrain results, validated against the entity's filter names.
    pub(crate) fn active_filters(
        &self,
        allowed: &[&str],
    ) -> Result<Vec<(&str, &str)>, ValidationError> {
        let mut active = Vec::new();
        for (name, value) in &self.filters {
            if !allowed.contains(&name.as_str()) {
                return Err(ValidationError::UnknownFilter(name.clone()));
            }
            if value.is_empty() || value == ALL {
                continue;
            }
            active.push((name.as_str(), value.as_str()));
        }
        Ok(active)
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<u32, ValidationError> {
    value
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

//! Search, filter, sort and pagination shared by every listing: the public job browser, the
//! organization and admin application tables, and the admin directories.

mod criteria;
mod engine;
mod records;

pub use criteria::{PageRequest, QueryCriteria, SortKey, ALL, DEFAULT_PAGE_SIZE};
pub use engine::{collate, filter_sort, QueryPage, Queryable};
pub use records::{JobSort, RecordSort};

//! Admin-side post management: the API seam, filtering and the cached table.

pub mod api;
pub mod collection;
pub mod filter;

pub use api::{ApiFailure, LocalPostApi, PostApi};
pub use collection::{AdminCollection, DEFAULT_PAGE_SIZE};
pub use filter::{apply_filter, FilterSpec, SortKey, SortOrder, StatusFilter};

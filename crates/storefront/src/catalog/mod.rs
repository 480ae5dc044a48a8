//! Catalog plumbing around the GraphQL client: page numbers, listing
//! filters and variation lookup.

pub mod pagination;
pub mod query;
pub mod variations;

pub use pagination::{PageLink, PageRequest, Pagination, PaginationView};
pub use query::{ProductFilter, ShopQuery, SortOrder, filter_href};
pub use variations::{
    SelectedAttributes, VariationMatchError, match_variation, resolved_attributes,
};

pub mod name_filter;
pub mod pagination;
pub mod shift_cache;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PageQuery {
    /// Page number, starting at 0
    #[schema(example = 0)]
    pub page: i64,
    /// Number of records in one page
    #[schema(example = 20)]
    pub size: i64,
}

/// Validated `LIMIT`/`OFFSET` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
}

impl PageRequest {
    pub fn new(page: i64, size: i64) -> Result<Self, ApiError> {
        if size <= 0 || page < 0 {
            return Err(ApiError::bad_request(
                "Page size and page number must be greater than 0",
            ));
        }

        let (page, size) = (page as u64, size as u64);
        if page.checked_mul(size).is_none() {
            return Err(ApiError::bad_request("Page number is too large"));
        }
        Ok(PageRequest { page, size })
    }

    /// Never overflows: `new` rejects pages whose offset does not fit.
    pub fn offset(&self) -> u64 {
        self.page * self.size
    }
}

#[derive(Debug, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[schema(example = 3)]
    pub no_of_pages: u64,
    #[schema(example = 1)]
    pub current_page_no: u64,
    #[schema(example = "http://localhost:8080/api/users?page=1&size=20", nullable = true)]
    pub next: Option<String>,
}

/// Builds the page envelope; `next` is only set while further pages exist.
pub fn page_meta(total: u64, req: PageRequest, base_url: &str, resource: &str) -> PageMeta {
    let no_of_pages = total.div_ceil(req.size);
    let next = if req.page + 1 < no_of_pages {
        Some(format!(
            "{}/{}?page={}&size={}",
            base_url.trim_end_matches('/'),
            resource,
            req.page + 1,
            req.size
        ))
    } else {
        None
    };

    PageMeta {
        no_of_pages,
        current_page_no: req.page + 1,
        next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0)]
    #[case(-1, 10)]
    #[case(2, -5)]
    #[case(i64::MAX, 4)]
    #[case(i64::MAX / 2, i64::MAX)]
    fn rejects_bad_windows(#[case] page: i64, #[case] size: i64) {
        assert!(PageRequest::new(page, size).is_err());
    }

    #[test]
    fn offset_is_page_times_size() {
        assert_eq!(PageRequest::new(3, 25).unwrap().offset(), 75);
    }

    #[test]
    fn huge_page_is_a_bad_request() {
        let err = PageRequest::new(i64::MAX, 4).unwrap_err();
        assert_eq!(err.to_string(), "Page number is too large");

        let widest = PageRequest::new(i64::MAX, 1).unwrap();
        assert_eq!(widest.offset(), i64::MAX as u64);
    }

    #[test]
    fn middle_page_links_to_next() {
        let meta = page_meta(45, PageRequest::new(1, 20).unwrap(), "http://host/api/", "users");
        assert_eq!(
            meta,
            PageMeta {
                no_of_pages: 3,
                current_page_no: 2,
                next: Some("http://host/api/users?page=2&size=20".into()),
            }
        );
    }

    #[test]
    fn last_and_out_of_range_pages_have_no_next() {
        let last = page_meta(45, PageRequest::new(2, 20).unwrap(), "http://host", "bank");
        assert_eq!(last.next, None);
        assert_eq!(last.current_page_no, 3);

        let beyond = page_meta(45, PageRequest::new(9, 20).unwrap(), "http://host", "bank");
        assert_eq!(beyond.next, None);
        assert_eq!(beyond.no_of_pages, 3);
    }

    #[test]
    fn empty_table_has_zero_pages() {
        let meta = page_meta(0, PageRequest::new(0, 10).unwrap(), "http://host", "users");
        assert_eq!(meta.no_of_pages, 0);
        assert_eq!(meta.next, None);
    }
}

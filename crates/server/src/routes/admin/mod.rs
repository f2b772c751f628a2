//! Back-office routes, mounted under `/api/admin`.
//!
//! Everything except login takes [`RequireAdmin`](crate::middleware::RequireAdmin).
//! Listings are paged with `?page=&per_page=` and answer with the total row
//! count and page count alongside the rows.

pub mod auth;
pub mod bakers;
pub mod catalog;
pub mod dashboard;
pub mod users;

use serde::{Deserialize, Serialize};

use crate::db::Page;

/// Paging parameters shared by every admin listing.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageQuery {
    #[must_use]
    pub fn page(&self) -> Page {
        Page::new(self.page, self.per_page)
    }
}

/// One page of rows. `rows` is flattened, so its own field names the array.
#[derive(Debug, Serialize)]
pub struct Paged<T> {
    #[serde(flatten)]
    pub rows: T,
    pub total: i64,
    pub pages: i64,
    pub current_page: i64,
}

impl<T> Paged<T> {
    #[must_use]
    pub const fn new(rows: T, total: i64, page: Page) -> Self {
        Self {
            rows,
            total,
            pages: page.pages(total),
            current_page: page.page,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct Users {
        users: Vec<u32>,
    }

    #[test]
    fn test_paged_body_shape() {
        let page = PageQuery {
            page: Some(2),
            per_page: Some(2),
        }
        .page();
        let body = Paged::new(Users { users: vec![3, 4] }, 5, page);

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"users": [3, 4], "total": 5, "pages": 3, "current_page": 2})
        );
    }
}

use serde::{Deserialize, Serialize};

/// Query parameters of the paginated user listing.
#[derive(Clone, Debug, Deserialize)]
pub struct UsersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// The pagination block of the listing response.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_users: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = (total + limit - 1) / limit;

        Pagination {
            current_page: page,
            total_pages,
            total_users: total,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

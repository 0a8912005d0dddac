use serde::Serialize;
use uuid::Uuid;

use super::repo_types::{User, UserFilter};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Public part of the user returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDto {
    pub id: i64,
    pub uuid: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub is_active: bool,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.meta.id,
            uuid: u.meta.uuid,
            first_name: u.first_name,
            last_name: u.last_name,
            username: u.username,
            email: u.email,
            phone: u.phone,
            is_active: u.is_active,
        }
    }
}

/// Raw `/users/search` query string. Kept as strings so malformed numbers
/// fall back to defaults instead of rejecting the request.
#[derive(Debug, Default)]
pub struct SearchParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
}

fn positive_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

impl SearchParams {
    /// Never fails: unknown keys are ignored and a repeated key keeps its
    /// first value.
    pub fn from_query(raw: Option<&str>) -> Self {
        let pairs: Vec<(String, String)> = raw
            .and_then(|q| serde_urlencoded::from_str(q).ok())
            .unwrap_or_default();

        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut params.page,
                "pageSize" => &mut params.page_size,
                "search" => &mut params.search,
                "status" => &mut params.status,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }

    pub fn page(&self) -> usize {
        positive_or(self.page.as_deref(), DEFAULT_PAGE)
    }

    pub fn page_size(&self) -> usize {
        positive_or(self.page_size.as_deref(), DEFAULT_PAGE_SIZE)
    }

    /// `status=true` selects active users, any other non-empty value
    /// inactive ones; absent or empty means no status filter.
    pub fn filter(&self) -> UserFilter {
        let is_active = self
            .status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| s == "true");
        let query = self.search.clone().filter(|s| !s.is_empty());
        UserFilter { is_active, query }
    }
}

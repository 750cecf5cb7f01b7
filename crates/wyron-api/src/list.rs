// Listing options shared by both transports.
//
// Paging and sorting are done by the remote service; the client only
// fills in defaults for anything left unset.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub const DEFAULT_LIMIT: u32 = 50;
pub const DEFAULT_SORT: &str = "created_at";

/// Sort direction for listing operations.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filters and paging for `list_users`.
///
/// Unset fields fall back to `limit=50`, `skip=0`, `sort="created_at"`,
/// `order=desc`. The optional filters are only sent when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListUsersOptions {
    pub social_id: Option<i64>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub skip: u32,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
}

impl ListUsersOptions {
    pub fn limit(&self) -> u32 {
        self.limit.filter(|limit| *limit > 0).unwrap_or(DEFAULT_LIMIT)
    }

    pub fn sort(&self) -> &str {
        self.sort
            .as_deref()
            .filter(|sort| !sort.is_empty())
            .unwrap_or(DEFAULT_SORT)
    }

    pub fn order(&self) -> SortOrder {
        self.order.unwrap_or_default()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref().filter(|status| !status.is_empty())
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().filter(|search| !search.is_empty())
    }

    /// Query parameters for the HTTP transport, defaults applied.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("limit", self.limit().to_string()),
            ("skip", self.skip.to_string()),
            ("sort", self.sort().to_owned()),
            ("order", self.order().to_string()),
        ];
        if let Some(social_id) = self.social_id {
            params.push(("social_id", social_id.to_string()));
        }
        if let Some(status) = self.status() {
            params.push(("status", status.to_owned()));
        }
        if let Some(search) = self.search() {
            params.push(("search", search.to_owned()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_unset_fields() {
        let query = ListUsersOptions::default().query();
        assert_eq!(
            query,
            vec![
                ("limit", "50".to_owned()),
                ("skip", "0".to_owned()),
                ("sort", "created_at".to_owned()),
                ("order", "desc".to_owned()),
            ]
        );
    }

    #[test]
    fn zero_limit_and_empty_strings_count_as_unset() {
        let options = ListUsersOptions {
            limit: Some(0),
            sort: Some(String::new()),
            status: Some(String::new()),
            search: Some(String::new()),
            ..ListUsersOptions::default()
        };
        assert_eq!(options.limit(), 50);
        assert_eq!(options.sort(), "created_at");
        assert_eq!(options.query().len(), 4);
    }

    #[test]
    fn filters_are_appended_when_present() {
        let options = ListUsersOptions {
            social_id: Some(42),
            status: Some("active".into()),
            search: Some("alice".into()),
            limit: Some(10),
            skip: 20,
            sort: Some("usage".into()),
            order: Some(SortOrder::Asc),
        };
        let query = options.query();
        assert!(query.contains(&("limit", "10".to_owned())));
        assert!(query.contains(&("skip", "20".to_owned())));
        assert!(query.contains(&("sort", "usage".to_owned())));
        assert!(query.contains(&("order", "asc".to_owned())));
        assert!(query.contains(&("social_id", "42".to_owned())));
        assert!(query.contains(&("status", "active".to_owned())));
        assert!(query.contains(&("search", "alice".to_owned())));
    }

    #[test]
    fn sort_order_parses_case_insensitively_lowercase() {
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!(SortOrder::Desc.to_string(), "desc");
    }
}

// Two-tier handler architecture: public token acquisition under /auth/*,
// authenticated role-gated operations under /api/*.
pub mod protected;
pub mod public;

use serde::Deserialize;
use serde_json::json;

use crate::filter::FilterData;

/// Common list-endpoint query string: ordering plus pagination. Entity
/// handlers add their own equality filters on top.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// e.g. `order=created_at desc` or `order=display_order`
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

impl ListQuery {
    /// FilterData with this query's order/pagination and the given equality
    /// conditions (skipping `None` values).
    pub fn to_filter(&self, default_order: &str, eq: &[(&str, Option<serde_json::Value>)]) -> FilterData {
        let mut conditions = serde_json::Map::new();
        for (column, value) in eq {
            if let Some(value) = value {
                conditions.insert((*column).to_string(), value.clone());
            }
        }

        FilterData {
            select: None,
            where_clause: if conditions.is_empty() { None } else { Some(conditions.into()) },
            order: Some(json!(self.order.clone().unwrap_or_else(|| default_order.to_string()))),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_uses_default_order_and_skips_absent_conditions() {
        let query = ListQuery::default();
        let filter = query.to_filter("created_at desc", &[("status", None), ("city", Some(json!("Erbil")))]);
        assert_eq!(filter.order, Some(json!("created_at desc")));
        assert_eq!(filter.where_clause, Some(json!({"city": "Erbil"})));
        assert_eq!(filter.limit, None);
    }

    #[test]
    fn explicit_order_and_pagination_pass_through() {
        let query = ListQuery { order: Some("points".to_string()), limit: Some(10), offset: Some(20) };
        let filter = query.to_filter("created_at desc", &[]);
        assert_eq!(filter.order, Some(json!("points")));
        assert_eq!(filter.limit, Some(10));
        assert_eq!(filter.offset, Some(20));
        assert!(filter.where_clause.is_none());
    }
}

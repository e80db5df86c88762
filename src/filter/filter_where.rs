use serde_json::Value;

use super::error::FilterError;
use super::types::{FilterOp, FilterWhereInfo, FilterWhereOptions};

pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
    conditions: Vec<FilterWhereInfo>,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self { param_values: vec![], param_index: starting_param_index, conditions: vec![] }
    }

    pub fn generate(
        where_data: &Value,
        starting_param_index: usize,
        options: &FilterWhereOptions,
    ) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(where_data, options)
    }

    pub fn generate_empty(options: &FilterWhereOptions) -> (String, Vec<Value>) {
        match Self::soft_delete_condition(options) {
            Some(condition) => (condition, vec![]),
            None => ("1=1".to_string(), vec![]),
        }
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        if where_data.is_null() {
            return Ok(());
        }
        match where_data {
            Value::Object(_) => Ok(()),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be a JSON object".to_string())),
        }
    }

    fn soft_delete_condition(options: &FilterWhereOptions) -> Option<String> {
        match options.soft_delete_column {
            Some(column) if !options.include_deleted => Some(format!("\"{}\" IS NULL", column)),
            _ => None,
        }
    }

    fn build(&mut self, where_data: &Value, options: &FilterWhereOptions) -> Result<(String, Vec<Value>), FilterError> {
        self.param_values.clear();
        self.conditions.clear();
        self.param_index = 0;

        self.parse_where_data(where_data)?;

        let mut sql_conditions = vec![];
        if let Some(condition) = Self::soft_delete_condition(options) {
            sql_conditions.push(condition);
        }
        let conditions_snapshot = self.conditions.clone();
        for condition in &conditions_snapshot {
            sql_conditions.push(self.build_sql_condition(condition)?);
        }
        let where_clause =
            if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") };
        Ok((where_clause, self.param_values.clone()))
    }

    fn parse_where_data(&mut self, where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Object(obj) => {
                for (key, value) in obj {
                    if key.starts_with('$') {
                        return Err(FilterError::UnsupportedOperator(key.clone()));
                    }
                    Self::validate_column_name(key)?;
                    self.parse_field_condition(key, value)?;
                }
                Ok(())
            }
            _ => Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string())),
        }
    }

    fn parse_field_condition(&mut self, field: &str, value: &Value) -> Result<(), FilterError> {
        if let Value::Object(obj) = value {
            for (op_key, op_val) in obj {
                let operator = Self::map_operator(op_key)?;
                self.conditions.push(FilterWhereInfo {
                    column: field.to_string(),
                    operator,
                    data: op_val.clone(),
                });
            }
        } else {
            // Implicit equality: { field: value }
            self.conditions.push(FilterWhereInfo {
                column: field.to_string(),
                operator: FilterOp::Eq,
                data: value.clone(),
            });
        }
        Ok(())
    }

    fn map_operator(op_key: &str) -> Result<FilterOp, FilterError> {
        Ok(match op_key {
            "$eq" => FilterOp::Eq,
            "$ne" | "$neq" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$like" => FilterOp::Like,
            "$ilike" => FilterOp::ILike,
            "$in" => FilterOp::In,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }

    fn validate_column_name(column: &str) -> Result<(), FilterError> {
        if column.is_empty() {
            return Err(FilterError::InvalidColumn("Column name cannot be empty".to_string()));
        }
        let mut chars = column.chars();
        let first = chars.next().unwrap();
        if (!first.is_alphabetic() && first != '_')
            || !column.chars().all(|c| c.is_alphanumeric() || c == '_')
        {
            return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", column)));
        }
        Ok(())
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        let quoted_column = format!("\"{}\"", condition.column);
        match condition.operator {
            FilterOp::Eq => {
                if condition.data.is_null() {
                    Ok(format!("{} IS NULL", quoted_column))
                } else {
                    Ok(format!("{} = {}", quoted_column, self.param(condition.data.clone())))
                }
            }
            FilterOp::Ne => {
                if condition.data.is_null() {
                    Ok(format!("{} IS NOT NULL", quoted_column))
                } else {
                    Ok(format!("{} <> {}", quoted_column, self.param(condition.data.clone())))
                }
            }
            FilterOp::Gt => Ok(format!("{} > {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::Gte => Ok(format!("{} >= {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::Lt => Ok(format!("{} < {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::Lte => Ok(format!("{} <= {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::Like => Ok(format!("{} LIKE {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::ILike => Ok(format!("{} ILIKE {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::In => {
                if let Value::Array(values) = &condition.data {
                    if values.is_empty() {
                        return Ok("1=0".to_string());
                    }
                    let params: Vec<String> = values.iter().map(|v| self.param(v.clone())).collect();
                    Ok(format!("{} IN ({})", quoted_column, params.join(", ")))
                } else {
                    Ok(format!("{} = {}", quoted_column, self.param(condition.data.clone())))
                }
            }
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn implicit_equality() {
        let (sql, params) =
            FilterWhere::generate(&json!({"status": "active"}), 0, &FilterWhereOptions::default()).unwrap();
        assert_eq!(sql, "\"status\" = $1");
        assert_eq!(params, vec![json!("active")]);
    }

    #[test]
    fn null_equality_becomes_is_null() {
        let (sql, params) =
            FilterWhere::generate(&json!({"thumbnail_url": null}), 0, &FilterWhereOptions::default()).unwrap();
        assert_eq!(sql, "\"thumbnail_url\" IS NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn ordering_comparisons_bind_in_sequence() {
        let (sql, params) = FilterWhere::generate(
            &json!({"points": {"$gte": 1, "$lte": 5}}),
            0,
            &FilterWhereOptions::default(),
        )
        .unwrap();
        assert_eq!(sql, "\"points\" >= $1 AND \"points\" <= $2");
        assert_eq!(params, vec![json!(1), json!(5)]);
    }

    #[test]
    fn in_list_expands_params() {
        let (sql, params) = FilterWhere::generate(
            &json!({"difficulty": {"$in": ["easy", "medium"]}}),
            0,
            &FilterWhereOptions::default(),
        )
        .unwrap();
        assert_eq!(sql, "\"difficulty\" IN ($1, $2)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let (sql, _) = FilterWhere::generate(
            &json!({"id": {"$in": []}}),
            0,
            &FilterWhereOptions::default(),
        )
        .unwrap();
        assert_eq!(sql, "1=0");
    }

    #[test]
    fn soft_delete_column_prepended_when_configured() {
        let options = FilterWhereOptions { soft_delete_column: Some("deleted_at"), include_deleted: false };
        let (sql, _) = FilterWhere::generate(&json!({"media_type": "video"}), 0, &options).unwrap();
        assert_eq!(sql, "\"deleted_at\" IS NULL AND \"media_type\" = $1");

        let with_deleted = FilterWhereOptions { soft_delete_column: Some("deleted_at"), include_deleted: true };
        let (sql, _) = FilterWhere::generate(&json!({"media_type": "video"}), 0, &with_deleted).unwrap();
        assert_eq!(sql, "\"media_type\" = $1");
    }

    #[test]
    fn rejects_logical_operators_and_bad_columns() {
        assert!(FilterWhere::generate(&json!({"$or": []}), 0, &FilterWhereOptions::default()).is_err());
        assert!(FilterWhere::generate(&json!({"na me": 1}), 0, &FilterWhereOptions::default()).is_err());
        assert!(FilterWhere::generate(&json!({"x": {"$regex": "a"}}), 0, &FilterWhereOptions::default()).is_err());
    }
}

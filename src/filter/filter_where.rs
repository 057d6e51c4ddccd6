use super::error::FilterError;
use super::types::{FieldKind, FilterOp, FilterWhereInfo, SqlParam};

/// Turns parsed conditions into a parameterized WHERE clause. All conditions
/// are AND-ed; placeholders are numbered `$1..$n` in bind order.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(conditions: &[FilterWhereInfo]) -> Result<(String, Vec<SqlParam>), FilterError> {
        let mut filter_where = Self::new(0);
        filter_where.build(conditions)
    }

    fn build(&mut self, conditions: &[FilterWhereInfo]) -> Result<(String, Vec<SqlParam>), FilterError> {
        let mut sql_conditions = Vec::with_capacity(conditions.len());
        for condition in conditions {
            sql_conditions.push(self.build_sql_condition(condition)?);
        }
        let where_clause = if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") };
        Ok((where_clause, std::mem::take(&mut self.param_values)))
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        let column = format!("t.\"{}\"", condition.column);
        let is_array = condition.kind == FieldKind::TextArray;

        match condition.operator {
            FilterOp::Eq => {
                let value = self.single(condition)?;
                if is_array {
                    // Array fields match when they contain the value
                    Ok(format!("{} = ANY({})", value, column))
                } else {
                    Ok(format!("{} = {}", column, value))
                }
            }
            FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte => {
                if !condition.kind.is_ordered() {
                    return Err(FilterError::OperatorNotAllowed {
                        field: condition.column.to_string(),
                        operator: format!("{:?}", condition.operator).to_lowercase(),
                    });
                }
                let symbol = match condition.operator {
                    FilterOp::Gt => ">",
                    FilterOp::Gte => ">=",
                    FilterOp::Lt => "<",
                    _ => "<=",
                };
                let value = self.single(condition)?;
                Ok(format!("{} {} {}", column, symbol, value))
            }
            FilterOp::In => {
                if condition.data.is_empty() {
                    return Ok("1=0".to_string());
                }
                let params: Vec<String> = condition.data.iter().map(|v| self.param(v.clone())).collect();
                if is_array {
                    // Overlap: the stored array shares at least one value
                    Ok(format!("{} && ARRAY[{}]::text[]", column, params.join(", ")))
                } else {
                    Ok(format!("{} IN ({})", column, params.join(", ")))
                }
            }
            FilterOp::WithinSphere => {
                let [lat, lng, radius] = condition.data.as_slice() else {
                    return Err(FilterError::OperatorNotAllowed {
                        field: condition.column.to_string(),
                        operator: "within_sphere".to_string(),
                    });
                };
                let lat = self.param(lat.clone());
                let lng = self.param(lng.clone());
                let radius = self.param(radius.clone());
                // Haversine angular distance in radians between the stored point and the centre
                Ok(format!(
                    "2 * asin(sqrt(power(sin(radians(t.\"latitude\" - {lat}) / 2), 2) \
                     + cos(radians({lat})) * cos(radians(t.\"latitude\")) \
                     * power(sin(radians(t.\"longitude\" - {lng}) / 2), 2))) <= {radius}",
                ))
            }
        }
    }

    fn single(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        match condition.data.as_slice() {
            [value] => Ok(self.param(value.clone())),
            _ => Err(FilterError::InvalidValue {
                field: condition.column.to_string(),
                value: format!("{} values", condition.data.len()),
            }),
        }
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(column: &'static str, kind: FieldKind, operator: FilterOp, data: Vec<SqlParam>) -> FilterWhereInfo {
        FilterWhereInfo { column, kind, operator, data }
    }

    #[test]
    fn empty_conditions_match_everything() {
        let (sql, params) = FilterWhere::generate(&[]).unwrap();
        assert_eq!(sql, "1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn comparisons_number_placeholders_in_order() {
        let (sql, params) = FilterWhere::generate(&[
            cond("average_cost", FieldKind::Number, FilterOp::Lte, vec![SqlParam::Number(10000.0)]),
            cond("housing", FieldKind::Boolean, FilterOp::Eq, vec![SqlParam::Bool(true)]),
        ])
        .unwrap();
        assert_eq!(sql, "t.\"average_cost\" <= $1 AND t.\"housing\" = $2");
        assert_eq!(params, vec![SqlParam::Number(10000.0), SqlParam::Bool(true)]);
    }

    #[test]
    fn array_fields_use_contains_and_overlap() {
        let (sql, _) = FilterWhere::generate(&[
            cond("careers", FieldKind::TextArray, FilterOp::Eq, vec![SqlParam::Text("Business".into())]),
            cond(
                "careers",
                FieldKind::TextArray,
                FilterOp::In,
                vec![SqlParam::Text("UI/UX".into()), SqlParam::Text("Other".into())],
            ),
        ])
        .unwrap();
        assert_eq!(sql, "$1 = ANY(t.\"careers\") AND t.\"careers\" && ARRAY[$2, $3]::text[]");
    }

    #[test]
    fn unordered_fields_reject_ordering_operators() {
        let err = FilterWhere::generate(&[cond(
            "careers",
            FieldKind::TextArray,
            FilterOp::Gt,
            vec![SqlParam::Text("a".into())],
        )]);
        assert!(err.is_err());

        // "9" > "10" as text, so weeks cannot be range-filtered
        let err = FilterWhere::generate(&[cond("weeks", FieldKind::Text, FilterOp::Gte, vec![SqlParam::Text("10".into())])]);
        assert!(matches!(err, Err(FilterError::OperatorNotAllowed { .. })));

        let (sql, _) = FilterWhere::generate(&[cond(
            "created_at",
            FieldKind::Timestamp,
            FilterOp::Lt,
            vec![SqlParam::Timestamp(chrono::Utc::now())],
        )])
        .unwrap();
        assert_eq!(sql, "t.\"created_at\" < $1");
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let (sql, _) = FilterWhere::generate(&[cond("name", FieldKind::Text, FilterOp::In, vec![])]).unwrap();
        assert_eq!(sql, "1=0");
    }

    #[test]
    fn sphere_condition_binds_three_params() {
        let (sql, params) = FilterWhere::generate(&[cond(
            "location",
            FieldKind::Number,
            FilterOp::WithinSphere,
            vec![SqlParam::Number(42.35), SqlParam::Number(-71.1), SqlParam::Number(0.0025)],
        )])
        .unwrap();
        assert!(sql.contains("asin"));
        assert!(sql.ends_with("<= $3"));
        assert_eq!(params.len(), 3);
    }
}

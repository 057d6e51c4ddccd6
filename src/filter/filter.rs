use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::pagination::PageRequest;
use super::types::{
    FieldDef, FilterOp, FilterOrderInfo, FilterWhereInfo, QueryDefaults, Relation, ResourceDef, SortDirection,
    SqlParam, SqlResult,
};
use crate::geo::radius::SearchArea;

const RESERVED: [&str; 4] = ["select", "sort", "page", "limit"];

/// A list query over one resource: request filters plus handler-supplied base
/// conditions, projection, ordering, relations and the page window.
#[derive(Debug)]
pub struct Filter {
    resource: &'static ResourceDef,
    select: Option<Vec<&'static FieldDef>>,
    conditions: Vec<FilterWhereInfo>,
    order: Vec<FilterOrderInfo>,
    relations: Vec<&'static Relation>,
    page: PageRequest,
}

impl Filter {
    pub fn new(resource: &'static ResourceDef, defaults: QueryDefaults) -> Self {
        Self {
            resource,
            select: None,
            conditions: vec![],
            order: vec![],
            relations: vec![],
            page: PageRequest {
                page: 1,
                limit: defaults.default_limit.clamp(1, defaults.max_limit.max(1)),
            },
        }
    }

    /// Builds a filter from raw query-string pairs.
    pub fn from_params(
        resource: &'static ResourceDef,
        params: &[(String, String)],
        defaults: QueryDefaults,
    ) -> Result<Self, FilterError> {
        let mut filter = Self::new(resource, defaults);

        for (key, value) in params {
            match key.as_str() {
                "select" => filter.select(value)?,
                "sort" => filter.order = FilterOrder::parse(resource, value)?,
                "page" => {
                    filter.page.page = parse_positive(value).unwrap_or(1);
                }
                "limit" => {
                    let limit = parse_positive(value).unwrap_or(defaults.default_limit);
                    filter.page.limit = limit.min(defaults.max_limit.max(1));
                }
                _ => filter.condition_from_key(key, value)?,
            }
        }

        Ok(filter)
    }

    fn select(&mut self, spec: &str) -> Result<(), FilterError> {
        let mut fields: Vec<&'static FieldDef> = Vec::new();
        for name in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let field = self
                .resource
                .field(name)
                .ok_or_else(|| FilterError::UnknownField(name.to_string()))?;
            if !fields.iter().any(|f| f.name == field.name) {
                fields.push(field);
            }
        }
        if !fields.iter().any(|f| f.name == "id") {
            if let Some(id) = self.resource.field("id") {
                fields.insert(0, id);
            }
        }
        self.select = Some(fields);
        Ok(())
    }

    fn condition_from_key(&mut self, key: &str, value: &str) -> Result<(), FilterError> {
        let (name, operator) = match key.split_once('[') {
            Some((name, rest)) => {
                let op = rest
                    .strip_suffix(']')
                    .filter(|op| !op.contains('[') && !op.contains(']'))
                    .ok_or_else(|| FilterError::MalformedKey(key.to_string()))?;
                (name, FilterOp::from_query_key(op)?)
            }
            None => (key, FilterOp::Eq),
        };
        if RESERVED.contains(&name) || name.is_empty() {
            return Err(FilterError::MalformedKey(key.to_string()));
        }

        let field = self
            .resource
            .field(name)
            .ok_or_else(|| FilterError::UnknownField(name.to_string()))?;
        let column = field.column.ok_or_else(|| FilterError::NotQueryable(name.to_string()))?;
        if matches!(operator, FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte) && !field.kind.is_ordered() {
            return Err(FilterError::OperatorNotAllowed {
                field: name.to_string(),
                operator: format!("{:?}", operator).to_lowercase(),
            });
        }

        let data = if operator == FilterOp::In {
            value
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| field.kind.parse(name, v))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            vec![field.kind.parse(name, value)?]
        };

        self.conditions.push(FilterWhereInfo {
            column,
            kind: field.kind,
            operator,
            data,
        });
        Ok(())
    }

    /// Adds a handler-supplied equality condition, e.g. scoping courses to a bootcamp.
    pub fn where_eq(mut self, name: &str, value: SqlParam) -> Result<Self, FilterError> {
        let field = self
            .resource
            .field(name)
            .ok_or_else(|| FilterError::UnknownField(name.to_string()))?;
        let column = field.column.ok_or_else(|| FilterError::NotQueryable(name.to_string()))?;
        self.conditions.insert(
            0,
            FilterWhereInfo {
                column,
                kind: field.kind,
                operator: FilterOp::Eq,
                data: vec![value],
            },
        );
        Ok(self)
    }

    /// Restricts rows to those whose stored point lies inside the search area.
    pub fn within_sphere(mut self, area: &SearchArea) -> Self {
        self.conditions.insert(
            0,
            FilterWhereInfo {
                column: "location",
                kind: super::types::FieldKind::Number,
                operator: FilterOp::WithinSphere,
                data: vec![
                    SqlParam::Number(area.latitude),
                    SqlParam::Number(area.longitude),
                    SqlParam::Number(area.radius),
                ],
            },
        );
        self
    }

    /// Attaches a named relation to every returned row.
    pub fn populate(mut self, name: &str) -> Result<Self, FilterError> {
        let relation = self
            .resource
            .relation(name)
            .ok_or_else(|| FilterError::UnknownRelation(name.to_string()))?;
        if !self.relations.iter().any(|r| r.name == relation.name) {
            self.relations.push(relation);
        }
        Ok(self)
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    /// Rows as JSON objects in a single `row` column.
    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.conditions)?;
        let order_clause = FilterOrder::generate(&self.effective_order());

        let query = format!(
            "SELECT {} AS row FROM \"{}\" t WHERE {} {} LIMIT {} OFFSET {}",
            self.build_select_clause(),
            self.resource.table,
            where_clause,
            order_clause,
            self.page.limit,
            self.page.offset(),
        );
        Ok(SqlResult { query, params })
    }

    /// Total rows matching the same conditions, ignoring order and window.
    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.conditions)?;
        let query = format!(
            "SELECT COUNT(*) FROM \"{}\" t WHERE {}",
            self.resource.table, where_clause
        );
        Ok(SqlResult { query, params })
    }

    fn effective_order(&self) -> Vec<FilterOrderInfo> {
        if !self.order.is_empty() {
            return self.order.clone();
        }
        match self.resource.field("createdAt").and_then(|f| f.column) {
            Some(column) => vec![FilterOrderInfo {
                column,
                sort: SortDirection::Desc,
            }],
            None => vec![],
        }
    }

    fn build_select_clause(&self) -> String {
        let fields: Vec<&FieldDef> = match &self.select {
            Some(fields) => fields.to_vec(),
            None => self.resource.fields.iter().collect(),
        };

        let mut parts = Vec::with_capacity(fields.len() + self.relations.len());
        for field in fields {
            if self.relations.iter().any(|r| r.replaces == Some(field.name)) {
                continue;
            }
            parts.push(format!("'{}', {}", field.name, field.select));
        }
        for relation in &self.relations {
            parts.push(format!("'{}', {}", relation.name, relation.select));
        }

        // json_build_object caps at 100 arguments; resources stay far below that
        format!("json_build_object({})", parts.join(", "))
    }
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|n| *n >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::resource::{BOOTCAMPS, COURSES};

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn default_query_sorts_newest_first_with_default_window() {
        let filter = Filter::from_params(&BOOTCAMPS, &[], QueryDefaults::default()).unwrap();
        let sql = filter.to_sql().unwrap();
        assert!(sql.query.contains("FROM \"bootcamps\" t WHERE 1=1"));
        assert!(sql.query.contains("ORDER BY t.\"created_at\" DESC, t.\"id\" ASC"));
        assert!(sql.query.ends_with("LIMIT 25 OFFSET 0"));
        assert!(sql.params.is_empty());
    }

    #[test]
    fn comparison_and_equality_filters() {
        let filter = Filter::from_params(
            &BOOTCAMPS,
            &params(&[("averageCost[lte]", "10000"), ("housing", "true"), ("careers[in]", "Business,Other")]),
            QueryDefaults::default(),
        )
        .unwrap();
        let sql = filter.to_count_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT COUNT(*) FROM \"bootcamps\" t WHERE t.\"average_cost\" <= $1 AND t.\"housing\" = $2 \
             AND t.\"careers\" && ARRAY[$3, $4]::text[]"
        );
        assert_eq!(sql.params.len(), 4);
    }

    #[test]
    fn page_and_limit_fall_back_and_cap() {
        let defaults = QueryDefaults {
            default_limit: 25,
            max_limit: 100,
        };
        let f = Filter::from_params(&BOOTCAMPS, &params(&[("page", "0"), ("limit", "abc")]), defaults).unwrap();
        assert_eq!(f.page(), PageRequest { page: 1, limit: 25 });

        let f = Filter::from_params(&BOOTCAMPS, &params(&[("page", "3"), ("limit", "500")]), defaults).unwrap();
        assert_eq!(f.page(), PageRequest { page: 3, limit: 100 });
        assert!(f.to_sql().unwrap().query.ends_with("LIMIT 100 OFFSET 200"));
    }

    #[test]
    fn select_always_keeps_id() {
        let f = Filter::from_params(&BOOTCAMPS, &params(&[("select", "name,description")]), QueryDefaults::default())
            .unwrap();
        let sql = f.to_sql().unwrap().query;
        assert!(sql.starts_with("SELECT json_build_object('id', t.\"id\", 'name', t.\"name\", 'description'"));
        assert!(!sql.contains("'housing'"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Filter::from_params(&BOOTCAMPS, &params(&[("colour", "red")]), QueryDefaults::default());
        assert!(matches!(err, Err(FilterError::UnknownField(_))));
        let err = Filter::from_params(&BOOTCAMPS, &params(&[("select", "name,bogus")]), QueryDefaults::default());
        assert!(matches!(err, Err(FilterError::UnknownField(_))));
        let err = Filter::from_params(&BOOTCAMPS, &params(&[("name[regex]", "x")]), QueryDefaults::default());
        assert!(matches!(err, Err(FilterError::UnsupportedOperator(_))));
        let err = Filter::from_params(&BOOTCAMPS, &params(&[("name[gt", "x")]), QueryDefaults::default());
        assert!(matches!(err, Err(FilterError::MalformedKey(_))));
    }

    #[test]
    fn ordering_operators_need_an_ordered_field() {
        let err = Filter::from_params(&COURSES, &params(&[("weeks[gt]", "10")]), QueryDefaults::default());
        assert!(matches!(err, Err(FilterError::OperatorNotAllowed { ref field, .. }) if field == "weeks"));
        let err = Filter::from_params(&BOOTCAMPS, &params(&[("housing[lt]", "true")]), QueryDefaults::default());
        assert!(matches!(err, Err(FilterError::OperatorNotAllowed { .. })));
        assert!(Filter::from_params(&COURSES, &params(&[("tuition[gte]", "1000")]), QueryDefaults::default()).is_ok());
    }

    #[test]
    fn base_conditions_come_first() {
        let id = uuid::Uuid::new_v4();
        let f = Filter::from_params(&COURSES, &params(&[("tuition[gt]", "1000")]), QueryDefaults::default())
            .unwrap()
            .where_eq("bootcamp", SqlParam::Uuid(id))
            .unwrap();
        let sql = f.to_count_sql().unwrap();
        assert!(sql.query.ends_with("WHERE t.\"bootcamp_id\" = $1 AND t.\"tuition\" > $2"));
        assert_eq!(sql.params[0], SqlParam::Uuid(id));
    }

    #[test]
    fn populate_replaces_foreign_key_field() {
        let f = Filter::new(&COURSES, QueryDefaults::default()).populate("bootcamp").unwrap();
        let sql = f.to_sql().unwrap().query;
        assert_eq!(sql.matches("'bootcamp',").count(), 1);
        assert!(sql.contains("FROM \"bootcamps\" b WHERE b.\"id\" = t.\"bootcamp_id\""));
        assert!(Filter::new(&COURSES, QueryDefaults::default()).populate("reviews").is_err());
    }

    #[test]
    fn sphere_condition_is_anded() {
        let area = SearchArea {
            latitude: 42.35,
            longitude: -71.1,
            radius: 10.0 / 3963.0,
        };
        let f = Filter::from_params(&BOOTCAMPS, &params(&[("housing", "true")]), QueryDefaults::default())
            .unwrap()
            .within_sphere(&area);
        let sql = f.to_count_sql().unwrap();
        assert!(sql.query.contains("<= $3 AND t.\"housing\" = $4"));
        assert_eq!(sql.params.len(), 4);
    }
}

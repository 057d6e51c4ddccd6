use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::FilterError;

/// Comparison operators accepted in `field[op]=value` query keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    /// Great-circle containment: point within an angular radius (radians).
    WithinSphere,
}

impl FilterOp {
    pub fn from_query_key(op: &str) -> Result<Self, FilterError> {
        Ok(match op {
            "gt" => FilterOp::Gt,
            "gte" => FilterOp::Gte,
            "lt" => FilterOp::Lt,
            "lte" => FilterOp::Lte,
            "in" => FilterOp::In,
            "eq" => FilterOp::Eq,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }
}

/// Storage type of a filterable field; drives value parsing and SQL shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Uuid,
    Timestamp,
    TextArray,
}

impl FieldKind {
    /// Whether `gt`/`gte`/`lt`/`lte` compare values meaningfully.
    pub fn is_ordered(&self) -> bool {
        matches!(self, FieldKind::Number | FieldKind::Timestamp)
    }

    pub fn parse(&self, field: &str, raw: &str) -> Result<SqlParam, FilterError> {
        let invalid = || FilterError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
        };
        let raw = raw.trim();
        Ok(match self {
            FieldKind::Text | FieldKind::TextArray => SqlParam::Text(raw.to_string()),
            FieldKind::Number => {
                let n: f64 = raw.parse().map_err(|_| invalid())?;
                if !n.is_finite() {
                    return Err(invalid());
                }
                SqlParam::Number(n)
            }
            FieldKind::Boolean => match raw {
                "true" => SqlParam::Bool(true),
                "false" => SqlParam::Bool(false),
                _ => return Err(invalid()),
            },
            FieldKind::Uuid => SqlParam::Uuid(Uuid::parse_str(raw).map_err(|_| invalid())?),
            FieldKind::Timestamp => SqlParam::Timestamp(
                DateTime::parse_from_rfc3339(raw).map_err(|_| invalid())?.with_timezone(&Utc),
            ),
        })
    }
}

/// A bound query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Number(f64),
    Bool(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    pub column: &'static str,
    pub kind: FieldKind,
    pub operator: FilterOp,
    pub data: Vec<SqlParam>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub column: &'static str,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

/// One field of a resource as exposed over the API.
#[derive(Debug)]
pub struct FieldDef {
    /// JSON name (camelCase), also the query-string key.
    pub name: &'static str,
    /// Backing column; `None` for computed fields that can only be selected.
    pub column: Option<&'static str>,
    /// SQL expression rendering the value, relative to table alias `t`.
    pub select: &'static str,
    pub kind: FieldKind,
}

/// Related data that can be attached to each row with a correlated sub-select.
#[derive(Debug)]
pub struct Relation {
    pub name: &'static str,
    /// Field whose plain value (usually a foreign key) the relation replaces.
    pub replaces: Option<&'static str>,
    pub select: &'static str,
}

/// Static description of a queryable resource.
#[derive(Debug)]
pub struct ResourceDef {
    pub name: &'static str,
    pub table: &'static str,
    pub fields: &'static [FieldDef],
    pub relations: &'static [Relation],
}

impl ResourceDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.name == name)
    }
}

/// Pagination limits applied when the request does not specify them.
#[derive(Debug, Clone, Copy)]
pub struct QueryDefaults {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            default_limit: 25,
            max_limit: 100,
        }
    }
}

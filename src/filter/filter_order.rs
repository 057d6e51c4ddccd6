use super::error::FilterError;
use super::types::{FilterOrderInfo, ResourceDef, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parses `sort=name,-createdAt`: ascending by default, `-` for descending.
    pub fn parse(resource: &'static ResourceDef, spec: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in spec.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let (name, sort) = match trimmed.strip_prefix('-') {
                Some(name) => (name, SortDirection::Desc),
                None => (trimmed.strip_prefix('+').unwrap_or(trimmed), SortDirection::Asc),
            };
            let field = resource
                .field(name)
                .ok_or_else(|| FilterError::UnknownField(name.to_string()))?;
            let column = field.column.ok_or_else(|| FilterError::NotQueryable(name.to_string()))?;
            out.push(FilterOrderInfo { column, sort });
        }
        Ok(out)
    }

    /// ORDER BY clause; `id` is appended as a tie-breaker so paging is stable.
    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        let mut parts: Vec<String> = infos
            .iter()
            .map(|i| format!("t.\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        if !infos.iter().any(|i| i.column == "id") {
            parts.push("t.\"id\" ASC".to_string());
        }
        format!("ORDER BY {}", parts.join(", "))
    }
}

//! Compiles access filters into SQL.
//!
//! A [`Where`] becomes a boolean SQL expression over the `documents`
//! table with positional `?` placeholders. Built-in fields map to their
//! columns; any other field is read from the JSON `data` column.

use rusqlite::ToSql;
use rusqlite::types::{ToSqlOutput, Value as SqlValue};
use serde_json::Value;

use crate::access::{Condition, PUBLISHED_FIELD, TENANT_FIELD, Where};

/// A fragment of SQL with bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    /// The SQL clause.
    pub sql: String,
    /// Bound parameter values, in placeholder order.
    pub params: Vec<SqlParam>,
}

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// Text parameter.
    Text(String),
    /// Integer parameter.
    Integer(i64),
    /// Float parameter.
    Float(f64),
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlParam::Text(s) => ToSqlOutput::Owned(SqlValue::Text(s.clone())),
            SqlParam::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            SqlParam::Float(f) => ToSqlOutput::Owned(SqlValue::Real(*f)),
        })
    }
}

impl SqlFragment {
    fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    fn join(parts: &[Where], separator: &str, empty: &str) -> Self {
        if parts.is_empty() {
            return Self::new(empty);
        }
        let compiled: Vec<SqlFragment> = parts.iter().map(compile).collect();
        let sql = compiled
            .iter()
            .map(|f| format!("({})", f.sql))
            .collect::<Vec<_>>()
            .join(separator);
        let params = compiled.into_iter().flat_map(|f| f.params).collect();
        Self { sql, params }
    }
}

/// Compiles a filter into a SQL boolean expression.
pub fn compile(filter: &Where) -> SqlFragment {
    match filter {
        Where::Field { field, condition } => compile_condition(field, condition),
        Where::And(parts) => SqlFragment::join(parts, " AND ", "1"),
        Where::Or(parts) => SqlFragment::join(parts, " OR ", "0"),
    }
}

fn compile_condition(field: &str, condition: &Condition) -> SqlFragment {
    let mut fragment = SqlFragment::new(String::new());
    let column = column_expr(field, &mut fragment.params);

    match condition {
        Condition::Equals(Value::Null) => {
            fragment.sql = format!("{} IS NULL", column);
        }
        Condition::Equals(value) => {
            fragment.params.push(to_param(value));
            fragment.sql = format!("{} = ?", column);
        }
        Condition::In(values) if values.is_empty() => {
            fragment.params.clear();
            fragment.sql = "0".to_string();
        }
        Condition::In(values) => {
            let placeholders = vec!["?"; values.len()].join(", ");
            fragment.params.extend(values.iter().map(to_param));
            fragment.sql = format!("{} IN ({})", column, placeholders);
        }
    }
    fragment
}

/// Column expression for a field, pushing the JSON path parameter for
/// fields stored inside `data`.
fn column_expr(field: &str, params: &mut Vec<SqlParam>) -> String {
    match field {
        TENANT_FIELD => "tenant_id".to_string(),
        PUBLISHED_FIELD => "published".to_string(),
        "id" => "id".to_string(),
        other => {
            params.push(SqlParam::Text(format!("$.\"{}\"", other.replace('"', ""))));
            "json_extract(data, ?)".to_string()
        }
    }
}

fn to_param(value: &Value) -> SqlParam {
    match value {
        Value::Bool(b) => SqlParam::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlParam::Integer(i),
            None => SqlParam::Float(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlParam::Text(s.clone()),
        // Null is handled by the caller; nested values compare as JSON text.
        other => SqlParam::Text(other.to_string()),
    }
}

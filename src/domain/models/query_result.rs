use serde::Serialize;

/// A single cell of a query result, decoded from whatever column type the
/// database reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Plain rendering without quoting, used for canned answers.
    pub fn to_plain(&self) -> String {
        match self {
            SqlValue::Null => "None".to_string(),
            SqlValue::Int(v) => v.to_string(),
            SqlValue::UInt(v) => v.to_string(),
            SqlValue::Float(v) => v.to_string(),
            SqlValue::Text(v) => v.clone(),
            SqlValue::Bytes(v) => String::from_utf8_lossy(v).into_owned(),
        }
    }
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Text(v) => write!(f, "'{}'", v.replace('\'', "\\'")),
            SqlValue::Bytes(v) => write!(f, "b'{}'", String::from_utf8_lossy(v)),
            other => f.write_str(&other.to_plain()),
        }
    }
}

/// Rows returned by executing a generated SQL statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<SqlValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First column of the first row, if any.
    pub fn first_scalar(&self) -> Option<&SqlValue> {
        self.rows.first().and_then(|row| row.first())
    }
}

/// Rendered as a list of row tuples, e.g. `[(2022, 'Electoral Disputes')]`.
impl std::fmt::Display for QueryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            if cells.len() == 1 {
                write!(f, "({},)", cells[0])?;
            } else {
                write!(f, "({})", cells.join(", "))?;
            }
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_rows_as_tuples() {
        let result = QueryResult::new(
            vec!["year".into(), "specialty".into()],
            vec![
                vec![SqlValue::Int(2022), SqlValue::Text("Electoral Disputes".into())],
                vec![SqlValue::Int(2021), SqlValue::Null],
            ],
        );
        assert_eq!(
            result.to_string(),
            "[(2022, 'Electoral Disputes'), (2021, None)]"
        );
    }

    #[test]
    fn single_column_rows_keep_trailing_comma() {
        let result = QueryResult::new(vec!["count".into()], vec![vec![SqlValue::Int(14)]]);
        assert_eq!(result.to_string(), "[(14,)]");
    }

    #[test]
    fn empty_result_renders_as_empty_list() {
        assert_eq!(QueryResult::empty().to_string(), "[]");
        assert!(QueryResult::empty().first_scalar().is_none());
    }

    #[test]
    fn first_scalar_is_top_left_cell() {
        let result = QueryResult::new(
            vec!["n".into(), "year".into()],
            vec![vec![SqlValue::UInt(7), SqlValue::Int(2020)]],
        );
        assert_eq!(result.first_scalar(), Some(&SqlValue::UInt(7)));
        assert_eq!(result.first_scalar().map(|v| v.to_plain()).as_deref(), Some("7"));
    }

    #[test]
    fn quotes_inside_text_are_escaped() {
        assert_eq!(SqlValue::Text("l'article".into()).to_string(), "'l\\'article'");
    }
}

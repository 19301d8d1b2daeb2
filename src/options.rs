use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::table_def::{ColumnDef, DEFAULT_TOLERANCE, MatchStrategy, TableDef};

/// Serializable table definition, e.g.
///
/// ```json
/// { "start": "Statement", "end": "Closing balance", "columns": ["^Date$", "^Amount$"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSpec {
    pub start: String,
    pub end: String,
    pub columns: Vec<String>,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default)]
    pub strategy: MatchStrategy,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl TableSpec {
    pub fn from_json(json: &str) -> Result<Self, ExtractError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn build(&self) -> Result<TableDef, ExtractError> {
        if self.columns.is_empty() {
            return Err(ExtractError::InvalidDefinition(
                "at least one column is required".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ExtractError::InvalidDefinition(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }

        let columns = self
            .columns
            .iter()
            .map(|pattern| compile("column", pattern).map(ColumnDef::new))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TableDef::new(
            compile("start", &self.start)?,
            compile("end", &self.end)?,
            columns,
        )
        .with_tolerance(self.tolerance)
        .with_strategy(self.strategy))
    }
}

fn compile(field: &str, pattern: &str) -> Result<Regex, ExtractError> {
    Regex::new(pattern).map_err(|error| {
        ExtractError::InvalidDefinition(format!("invalid {field} pattern '{pattern}': {error}"))
    })
}

#[cfg(test)]
mod tests {
    use super::TableSpec;
    use crate::error::ExtractError;
    use crate::table_def::MatchStrategy;

    #[test]
    fn parses_minimal_spec_with_defaults() {
        let spec = TableSpec::from_json(r#"{"start":"A","end":"B","columns":["^x$","^y$"]}"#)
            .expect("spec should parse");
        assert_eq!(spec.tolerance, 1.0);
        assert_eq!(spec.strategy, MatchStrategy::FirstDeclared);

        let table = spec.build().expect("table should build");
        assert_eq!(table.columns().len(), 2);
        assert!(table.start_marker().is_match("A"));
    }

    #[test]
    fn parses_strategy_and_tolerance() {
        let spec = TableSpec::from_json(
            r#"{"start":"A","end":"B","columns":["x"],"tolerance":2.5,"strategy":"nearest"}"#,
        )
        .expect("spec should parse");
        let table = spec.build().expect("table should build");
        assert_eq!(table.tolerance(), 2.5);
        assert_eq!(table.strategy(), MatchStrategy::Nearest);
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = TableSpec::from_json(r#"{"start":"A","end":"B","columns":[],"colums":[]}"#)
            .expect_err("unknown field should fail");
        assert!(matches!(err, ExtractError::Config(_)));
    }

    #[test]
    fn rejects_empty_columns_and_negative_tolerance() {
        let mut spec = TableSpec::from_json(r#"{"start":"A","end":"B","columns":[]}"#)
            .expect("spec should parse");
        assert!(matches!(
            spec.build(),
            Err(ExtractError::InvalidDefinition(_))
        ));

        spec.columns.push("x".to_string());
        spec.tolerance = -1.0;
        let err = spec.build().expect_err("negative tolerance should fail");
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn rejects_invalid_regex() {
        let spec = TableSpec::from_json(r#"{"start":"(","end":"B","columns":["x"]}"#)
            .expect("spec should parse");
        let err = spec.build().expect_err("bad start pattern should fail");
        assert!(matches!(err, ExtractError::InvalidDefinition(_)));
        assert!(err.to_string().contains("invalid start pattern '('"));

        let spec = TableSpec::from_json(r#"{"start":"A","end":"B","columns":["x","[z"]}"#)
            .expect("spec should parse");
        let err = spec.build().expect_err("bad column pattern should fail");
        assert!(matches!(err, ExtractError::InvalidDefinition(_)));
        assert!(err.to_string().contains("invalid column pattern '[z'"));
    }
}

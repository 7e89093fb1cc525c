//! DTOs for the Sheets v4 `values` resource.
//!
//! Cells arrive as arbitrary JSON scalars when formulas produce numbers or
//! booleans; they are flattened to strings in one pass.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ports::SheetRows;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ValueRangeDto {
    #[serde(default)]
    pub(super) range: String,
    #[serde(default)]
    pub(super) values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ValueRangeBody<'a> {
    pub(super) range: &'a str,
    pub(super) major_dimension: &'static str,
    pub(super) values: &'a SheetRows,
}

impl ValueRangeDto {
    pub(super) fn into_rows(self) -> SheetRows {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect()
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_values_decode_as_no_rows() {
        let dto: ValueRangeDto =
            serde_json::from_value(json!({"range": "AARs!A1:GR1", "majorDimension": "ROWS"}))
                .expect("decodes");
        assert_eq!(dto.range, "AARs!A1:GR1");
        assert!(dto.into_rows().is_empty());
    }

    #[test]
    fn scalar_cells_are_stringified() {
        let dto: ValueRangeDto = serde_json::from_value(json!({
            "range": "Stats!A1:D2",
            "values": [["name", 42, true, null], ["only"]]
        }))
        .expect("decodes");
        assert_eq!(
            dto.into_rows(),
            vec![
                vec![
                    "name".to_owned(),
                    "42".to_owned(),
                    "true".to_owned(),
                    String::new()
                ],
                vec!["only".to_owned()],
            ]
        );
    }

    #[test]
    fn write_body_uses_row_major_camel_case() {
        let rows = vec![vec!["a".to_owned(), "b".to_owned()]];
        let body = ValueRangeBody {
            range: "AARs!A2:B2",
            major_dimension: "ROWS",
            values: &rows,
        };
        assert_eq!(
            serde_json::to_value(&body).expect("serialises"),
            json!({"range": "AARs!A2:B2", "majorDimension": "ROWS", "values": [["a", "b"]]})
        );
    }
}

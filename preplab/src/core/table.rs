//! Display rendering for dataframes.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// A serializable rendering of a table: column names plus rows of display
/// strings. Used by the API and the CLI; comparison always happens on the
/// underlying frames, never on views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn from_frame(frame: &DataFrame) -> Self {
        let columns = frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let mut rows = Vec::with_capacity(frame.height());
        for row_idx in 0..frame.height() {
            let mut row = Vec::with_capacity(frame.width());
            for column in frame.get_columns() {
                let series = column.as_materialized_series();
                let cell = match series.get(row_idx) {
                    Ok(value) if value.is_null() => String::new(),
                    Ok(value) => value.to_string().trim_matches('"').to_string(),
                    Err(_) => String::new(),
                };
                row.push(cell);
            }
            rows.push(row);
        }

        TableView { columns, rows }
    }
}

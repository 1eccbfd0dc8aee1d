//! Stacked bar charts built from tabular rows.
//!
//! Any slice of `Serialize` records can be charted: each record is read as a
//! map of column name to value and the requested columns are pulled out as
//! numeric series. The resulting [`StackedBarChart`] is a plain description
//! which serializes to a plotly figure for rendering elsewhere.

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::{fs::File, io::BufWriter, path::Path};

use crate::error::{AmortizationError, Result};

#[derive(Clone, PartialEq, Debug, Default, Serialize)]
pub struct ChartLayout {
    pub title: String,
    pub xaxis_title: String,
    pub yaxis_title: String,
    pub legend_title: String,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct StackedBarChart {
    pub layout: ChartLayout,
    pub x: Series,
    /// Bars are stacked bottom-up in this order.
    pub y: Vec<Series>,
}

impl StackedBarChart {
    pub fn series(&self, name: &str) -> Option<&Series> {
        self.y.iter().find(|s| s.name == name)
    }

    /// Height of the stacked bar at each x value. A series shorter than the
    /// x axis adds nothing past its last value.
    pub fn stack_totals(&self) -> Vec<f64> {
        (0..self.x.values.len())
            .map(|i| self.y.iter().filter_map(|s| s.values.get(i)).sum::<f64>())
            .collect()
    }

    /// Plotly figure JSON: one bar trace per series with `barmode: stack`.
    pub fn to_figure_json(&self) -> Value {
        let data: Vec<Value> = self
            .y
            .iter()
            .map(|s| {
                json!({
                    "type": "bar",
                    "name": s.name,
                    "x": self.x.values,
                    "y": s.values,
                })
            })
            .collect();
        json!({
            "data": data,
            "layout": {
                "barmode": "stack",
                "title": { "text": self.layout.title },
                "xaxis": { "title": { "text": self.layout.xaxis_title } },
                "yaxis": { "title": { "text": self.layout.yaxis_title } },
                "legend": { "title": { "text": self.layout.legend_title } },
            },
        })
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &self.to_figure_json())?;
        Ok(())
    }
}

fn column(records: &[Map<String, Value>], name: &str) -> Result<Vec<f64>> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| match record.get(name) {
            Some(v) => v.as_f64().ok_or_else(|| {
                let reason = format!("row {} holds non-numeric value {}", i, v);
                AmortizationError::invalid(name, reason)
            }),
            None => {
                let reason = format!("row {} has no such column", i);
                Err(AmortizationError::invalid(name, reason))
            }
        })
        .collect()
}

/// Build a stacked bar chart from `rows`.
///
/// `x` names the column used for the x axis. `y` lists `(column, label)`
/// pairs; the label becomes the series name shown in the legend.
pub fn stacked_bar_chart<T: Serialize>(
    rows: &[T],
    x: &str,
    y: &[(&str, &str)],
    layout: ChartLayout,
) -> Result<StackedBarChart> {
    if y.is_empty() {
        let reason = "at least one column is required";
        return Err(AmortizationError::invalid("y", reason));
    }
    let records = rows
        .iter()
        .map(|row| -> Result<Map<String, Value>> {
            match serde_json::to_value(row)? {
                Value::Object(map) => Ok(map),
                other => Err(AmortizationError::invalid(
                    "rows",
                    format!("expected records with named columns, got {}", other),
                )),
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let x = Series {
        name: x.to_string(),
        values: column(&records, x)?,
    };
    let y = y
        .iter()
        .map(|(col, label)| -> Result<Series> {
            Ok(Series {
                name: label.to_string(),
                values: column(&records, col)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(StackedBarChart { layout, x, y })
}

// src/store/arrow.rs

use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, Float64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::dataset::{Cell, Dataset};

/// Float64 when every non-null cell is a number, Utf8 otherwise.
pub fn infer_column_type(cells: &[&Cell]) -> DataType {
    if cells.iter().all(|c| matches!(c, Cell::Null | Cell::Number(_))) {
        DataType::Float64
    } else {
        DataType::Utf8
    }
}

/// Build the Arrow schema + batch for a dataset. All fields are nullable.
pub fn dataset_to_batch(ds: &Dataset) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(ds.columns().len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(ds.columns().len());

    for (idx, name) in ds.columns().iter().enumerate() {
        let cells: Vec<&Cell> = ds.rows().iter().map(|r| &r[idx]).collect();
        let dt = infer_column_type(&cells);
        let array: ArrayRef = match dt {
            DataType::Float64 => Arc::new(
                cells
                    .iter()
                    .map(|c| c.as_number())
                    .collect::<Float64Array>(),
            ),
            _ => Arc::new(
                cells
                    .iter()
                    .map(|c| match c {
                        Cell::Null => None,
                        other => Some(other.to_string()),
                    })
                    .collect::<StringArray>(),
            ),
        };
        fields.push(Field::new(name, dt, true));
        arrays.push(array);
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .context("building record batch from dataset")
}

/// Rows of a stored batch as JSON records, in schema column order.
pub fn batch_to_records(batch: &RecordBatch) -> Vec<Map<String, Value>> {
    let schema = batch.schema();
    let mut records = vec![Map::new(); batch.num_rows()];

    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        let name = field.name();
        if let Some(arr) = column.as_any().downcast_ref::<Float64Array>() {
            for (row, rec) in records.iter_mut().enumerate() {
                let v = if arr.is_null(row) {
                    Value::Null
                } else {
                    Value::from(arr.value(row))
                };
                rec.insert(name.clone(), v);
            }
        } else if let Some(arr) = column.as_any().downcast_ref::<StringArray>() {
            for (row, rec) in records.iter_mut().enumerate() {
                let v = if arr.is_null(row) {
                    Value::Null
                } else {
                    Value::String(arr.value(row).to_string())
                };
                rec.insert(name.clone(), v);
            }
        } else {
            for rec in records.iter_mut() {
                rec.insert(name.clone(), Value::Null);
            }
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_columns_fall_back_to_text() -> Result<()> {
        let mut ds = Dataset::new(["tipo_residuo", "total", "obs"]);
        ds.push_row(vec![Cell::from("Papel"), Cell::Number(1.5), Cell::Number(2.0)]);
        ds.push_row(vec![Cell::Null, Cell::Number(0.0), Cell::from("n/d")]);

        let batch = dataset_to_batch(&ds)?;
        let schema = batch.schema();
        assert_eq!(schema.field(0).data_type(), &DataType::Utf8);
        assert_eq!(schema.field(1).data_type(), &DataType::Float64);
        assert_eq!(schema.field(2).data_type(), &DataType::Utf8);

        let records = batch_to_records(&batch);
        assert_eq!(records[0]["obs"], "2");
        assert_eq!(records[1]["tipo_residuo"], Value::Null);
        assert_eq!(records[1]["total"], 0.0);
        Ok(())
    }
}

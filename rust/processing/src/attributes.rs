// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-cell attribute tables
//!
//! One table per topology table. Every column holds exactly one entry per
//! cell, in cell order.

use geojson_mesh_core::{AttributeValue, ValueType};
use serde::Serialize;

/// Name and type of one attribute column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type", serialize_with = "serialize_value_type")]
    pub ty: ValueType,
}

fn serialize_value_type<S: serde::Serializer>(ty: &ValueType, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(ty.name())
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Typed column storage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnData {
    Int(Vec<i64>),
    Double(Vec<f64>),
    String(Vec<String>),
}

impl ColumnData {
    fn with_capacity(ty: ValueType, capacity: usize) -> Self {
        match ty {
            ValueType::Int => ColumnData::Int(Vec::with_capacity(capacity)),
            ValueType::Double => ColumnData::Double(Vec::with_capacity(capacity)),
            ValueType::String => ColumnData::String(Vec::with_capacity(capacity)),
        }
    }

    /// Append one entry. A value of the wrong type is stored as the
    /// column type's empty value so the column keeps one entry per cell.
    fn push(&mut self, value: &AttributeValue) {
        match (self, value) {
            (ColumnData::Int(v), AttributeValue::Int(x)) => v.push(*x),
            (ColumnData::Double(v), AttributeValue::Double(x)) => v.push(*x),
            (ColumnData::String(v), AttributeValue::String(x)) => v.push(x.clone()),
            (column, value) => {
                tracing::error!(
                    found = %value.value_type(),
                    expected = %column.value_type(),
                    "Attribute value does not match its column type"
                );
                match column {
                    ColumnData::Int(v) => v.push(0),
                    ColumnData::Double(v) => v.push(f64::NAN),
                    ColumnData::String(v) => v.push(String::new()),
                }
            }
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            ColumnData::Int(_) => ValueType::Int,
            ColumnData::Double(_) => ValueType::Double,
            ColumnData::String(_) => ValueType::String,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Double(v) => v.len(),
            ColumnData::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, row: usize) -> Option<AttributeValue> {
        match self {
            ColumnData::Int(v) => v.get(row).map(|&x| AttributeValue::Int(x)),
            ColumnData::Double(v) => v.get(row).map(|&x| AttributeValue::Double(x)),
            ColumnData::String(v) => v.get(row).map(|x| AttributeValue::String(x.clone())),
        }
    }

    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            ColumnData::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_doubles(&self) -> Option<&[f64]> {
        match self {
            ColumnData::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            ColumnData::String(v) => Some(v),
            _ => None,
        }
    }
}

/// A named attribute column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// Attribute columns attached to one cell table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttributeTable {
    columns: Vec<Column>,
    rows: usize,
}

impl AttributeTable {
    /// Materialize columns for a cell table.
    ///
    /// `rows` holds one value per schema column for each feature;
    /// `cell_rows[i]` is the feature row of cell `i`.
    pub fn from_rows(schema: &[ColumnSpec], rows: &[Vec<AttributeValue>], cell_rows: &[usize]) -> Self {
        let mut columns: Vec<Column> = schema
            .iter()
            .map(|spec| Column {
                name: spec.name.clone(),
                data: ColumnData::with_capacity(spec.ty, cell_rows.len()),
            })
            .collect();

        for &row in cell_rows {
            for (column, value) in columns.iter_mut().zip(&rows[row]) {
                column.data.push(value);
            }
        }

        Self {
            columns,
            rows: cell_rows.len(),
        }
    }

    /// Number of cells described
    #[inline]
    pub fn len(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.data)
    }

    pub fn value(&self, name: &str, row: usize) -> Option<AttributeValue> {
        self.column(name)?.get(row)
    }
}

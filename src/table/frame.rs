//! Parquet-backed column store that remembers where every row came from

use crate::io::configuration::{PANDAS_INDEX_COLUMN, PANDAS_METADATA_KEY};
use crate::io::error::{AttackError, Result, WithPath, columnar_error};
use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray, UInt64Array};
use arrow::compute::{cast, concat_batches, take};
use arrow::datatypes::{DataType, Field, FieldRef, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fs::File;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

/// A single record batch plus the original position of each row
///
/// Slicing, reordering and column edits carry the row positions along, so a
/// ranked subset still identifies its rows in the source table. On disk the
/// positions are stored as a pandas index; the in-memory schema never holds
/// pandas metadata, it is regenerated on every write.
#[derive(Debug, Clone)]
pub struct Table {
    batch: RecordBatch,
    row_ids: Vec<usize>,
}

impl Table {
    /// Wrap a record batch; rows are numbered from zero
    ///
    /// Pandas schema metadata is dropped.
    pub fn new(batch: RecordBatch) -> Self {
        let row_ids = (0..batch.num_rows()).collect();
        Self {
            batch: strip_pandas_metadata(batch),
            row_ids,
        }
    }

    /// Build a table from named columns of equal length
    ///
    /// # Errors
    ///
    /// Returns an error if the columns differ in length
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ArrayRef)>,
        S: AsRef<str>,
    {
        let batch = RecordBatch::try_from_iter(columns)
            .map_err(|e| columnar_error("build table", e))?;
        Ok(Self::new(batch))
    }

    /// Read every row group of a parquet file into one table
    ///
    /// A single-level integer pandas index, stored as a column or as a range,
    /// becomes the row identity; the index column itself is not kept.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be opened
    /// - The file is not valid parquet
    /// - Row groups cannot be decoded or concatenated
    pub fn read_parquet(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| AttackError::FileSystem {
            path: path.to_path_buf(),
            operation: "open table",
            source: e,
        })?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file).with_path(path)?;
        let schema = Arc::clone(builder.schema());
        let reader = builder.build().with_path(path)?;
        let batches = reader
            .collect::<std::result::Result<Vec<_>, ArrowError>>()
            .map_err(|e| columnar_error("decode row groups", e))?;
        let batch =
            concat_batches(&schema, &batches).map_err(|e| columnar_error("concat row groups", e))?;

        Self::from_stored(batch)
    }

    fn from_stored(batch: RecordBatch) -> Result<Self> {
        let rows = batch.num_rows();
        let index = batch
            .schema()
            .metadata()
            .get(PANDAS_METADATA_KEY)
            .and_then(|m| stored_index(m));

        match index {
            Some(StoredIndex::Column(name)) => {
                let Some(row_ids) = batch.column_by_name(&name).and_then(integer_row_ids) else {
                    return Ok(Self::new(batch));
                };
                let table = Self::new(batch).drop_columns(&[name.as_str()])?;
                Ok(Self { row_ids, ..table })
            }
            Some(StoredIndex::Range { start, step }) => {
                let mut table = Self::new(batch);
                if let Some(row_ids) = range_row_ids(start, step, rows) {
                    table.row_ids = row_ids;
                }
                Ok(table)
            }
            None => Ok(Self::new(batch)),
        }
    }

    /// Write the table as a single parquet file, creating parent directories
    ///
    /// Row identity is written as the pandas index column
    /// `__index_level_0__` together with matching pandas metadata, unless the
    /// table already has a column of that name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created or the
    /// data cannot be encoded
    pub fn write_parquet(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| AttackError::FileSystem {
                    path: parent.to_path_buf(),
                    operation: "create directory",
                    source: e,
                })?;
            }
        }

        let file = File::create(path).map_err(|e| AttackError::FileSystem {
            path: path.to_path_buf(),
            operation: "create table",
            source: e,
        })?;
        let batch = self.stored_batch()?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).with_path(path)?;
        writer.write(&batch).with_path(path)?;
        writer.close().with_path(path)?;
        Ok(())
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// Original row position of every row, in current order
    pub fn row_ids(&self) -> &[usize] {
        &self.row_ids
    }

    /// Underlying record batch
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Column names in schema order
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.batch.column_by_name(name).is_some()
    }

    /// Look up a column by name
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` if the table has no such column
    pub fn column(&self, name: &str) -> Result<&ArrayRef> {
        self.batch
            .column_by_name(name)
            .ok_or_else(|| AttackError::MissingColumn {
                column: name.to_string(),
                available: self.column_names(),
            })
    }

    /// Column values as text, `None` for nulls
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or cannot be cast to text
    pub fn strings(&self, name: &str) -> Result<Vec<Option<String>>> {
        let column = cast(self.column(name)?.as_ref(), &DataType::Utf8)
            .map_err(|e| columnar_error("cast to text", e))?;
        let text = column
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| AttackError::InvalidParameter {
                parameter: "column",
                value: name.to_string(),
                reason: "not a text column".to_string(),
            })?;
        Ok(text.iter().map(|v| v.map(str::to_string)).collect())
    }

    /// Column values as floats, `None` for nulls
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or not numeric
    pub fn numbers(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = cast(self.column(name)?.as_ref(), &DataType::Float64)
            .map_err(|e| columnar_error("cast to float", e))?;
        let values = column
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| AttackError::InvalidParameter {
                parameter: "column",
                value: name.to_string(),
                reason: "not a numeric column".to_string(),
            })?;
        Ok(values.iter().collect())
    }

    /// Contiguous range of rows, clamped to the table
    pub fn slice_rows(&self, range: Range<usize>) -> Self {
        let start = range.start.min(self.num_rows());
        let end = range.end.clamp(start, self.num_rows());
        Self {
            batch: self.batch.slice(start, end - start),
            row_ids: self.row_ids.get(start..end).unwrap_or_default().to_vec(),
        }
    }

    /// First `amount` rows
    pub fn head(&self, amount: usize) -> Self {
        self.slice_rows(0..amount)
    }

    /// Rows at the given positions, in the given order
    ///
    /// # Errors
    ///
    /// Returns an error if a position is out of bounds
    pub fn take_rows(&self, positions: &[usize]) -> Result<Self> {
        let row_ids = positions
            .iter()
            .map(|&p| {
                self.row_ids
                    .get(p)
                    .copied()
                    .ok_or_else(|| AttackError::InvalidParameter {
                        parameter: "row",
                        value: p.to_string(),
                        reason: format!("table has {} rows", self.num_rows()),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let indices = UInt64Array::from_iter_values(positions.iter().map(|&p| p as u64));
        let columns = self
            .batch
            .columns()
            .iter()
            .map(|column| take(column.as_ref(), &indices, None))
            .collect::<std::result::Result<Vec<_>, ArrowError>>()
            .map_err(|e| columnar_error("take rows", e))?;

        let batch = Self::assemble(self.batch.schema(), columns, positions.len())?;
        Ok(Self { batch, row_ids })
    }

    /// Add a float column, replacing any column of the same name
    ///
    /// # Errors
    ///
    /// Returns an error if the value count differs from the row count
    pub fn with_f64_column(&self, name: &str, values: &[f64]) -> Result<Self> {
        let column: ArrayRef = Arc::new(Float64Array::from(values.to_vec()));
        self.with_column(name, column)
    }

    /// Add a column, replacing any column of the same name
    ///
    /// # Errors
    ///
    /// Returns an error if the column length differs from the row count
    pub fn with_column(&self, name: &str, column: ArrayRef) -> Result<Self> {
        let schema = self.batch.schema();
        let field: FieldRef = Arc::new(Field::new(name, column.data_type().clone(), true));

        let mut fields: Vec<FieldRef> = Vec::with_capacity(schema.fields().len() + 1);
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len() + 1);
        let mut replaced = false;
        for (existing, values) in schema.fields().iter().zip(self.batch.columns()) {
            if existing.name() == name {
                fields.push(Arc::clone(&field));
                columns.push(Arc::clone(&column));
                replaced = true;
            } else {
                fields.push(Arc::clone(existing));
                columns.push(Arc::clone(values));
            }
        }
        if !replaced {
            fields.push(field);
            columns.push(column);
        }

        let schema = Arc::new(Schema::new_with_metadata(
            fields,
            without_pandas_metadata(&schema),
        ));
        let batch = Self::assemble(schema, columns, self.num_rows())?;
        Ok(Self {
            batch,
            row_ids: self.row_ids.clone(),
        })
    }

    /// Remove the named columns that exist; absent names are ignored
    ///
    /// # Errors
    ///
    /// Returns an error if the remaining columns cannot form a batch
    pub fn drop_columns(&self, names: &[&str]) -> Result<Self> {
        let schema = self.batch.schema();
        let keep: Vec<usize> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| !names.contains(&f.name().as_str()))
            .map(|(i, _)| i)
            .collect();

        if keep.len() == schema.fields().len() {
            return Ok(self.clone());
        }

        let fields: Vec<FieldRef> = keep
            .iter()
            .filter_map(|&i| schema.fields().get(i).cloned())
            .collect();
        let columns: Vec<ArrayRef> = keep
            .iter()
            .filter_map(|&i| self.batch.columns().get(i).cloned())
            .collect();
        let schema = Arc::new(Schema::new_with_metadata(
            fields,
            without_pandas_metadata(&schema),
        ));
        let batch = Self::assemble(schema, columns, self.num_rows())?;

        Ok(Self {
            batch,
            row_ids: self.row_ids.clone(),
        })
    }

    fn stored_batch(&self) -> Result<RecordBatch> {
        let schema = self.batch.schema();
        let mut metadata = without_pandas_metadata(&schema);
        let mut fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
        let mut columns = self.batch.columns().to_vec();

        if !self.has_column(PANDAS_INDEX_COLUMN) {
            let index: ArrayRef = Arc::new(Int64Array::from_iter_values(
                self.row_ids.iter().map(|&id| id as i64),
            ));
            fields.push(Arc::new(Field::new(
                PANDAS_INDEX_COLUMN,
                DataType::Int64,
                false,
            )));
            columns.push(index);
            metadata.insert(PANDAS_METADATA_KEY.to_string(), pandas_metadata(&fields));
        }

        let schema = Arc::new(Schema::new_with_metadata(fields, metadata));
        Self::assemble(schema, columns, self.num_rows())
    }

    fn assemble(schema: SchemaRef, columns: Vec<ArrayRef>, rows: usize) -> Result<RecordBatch> {
        let options = RecordBatchOptions::new().with_row_count(Some(rows));
        RecordBatch::try_new_with_options(schema, columns, &options)
            .map_err(|e| columnar_error("assemble batch", e))
    }
}

// The pandas block lists the original columns and index, stale once either
// changes
fn without_pandas_metadata(schema: &Schema) -> HashMap<String, String> {
    let mut metadata = schema.metadata().clone();
    metadata.remove(PANDAS_METADATA_KEY);
    metadata
}

fn strip_pandas_metadata(batch: RecordBatch) -> RecordBatch {
    let schema = batch.schema();
    if !schema.metadata().contains_key(PANDAS_METADATA_KEY) {
        return batch;
    }

    let stripped = Arc::new(Schema::new_with_metadata(
        schema.fields().clone(),
        without_pandas_metadata(&schema),
    ));
    let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
    RecordBatch::try_new_with_options(stripped, batch.columns().to_vec(), &options)
        .unwrap_or(batch)
}

/// Where a pandas writer put the row index
#[derive(Debug, PartialEq, Eq)]
enum StoredIndex {
    Column(String),
    Range { start: i64, step: i64 },
}

// Only single-level indexes are understood
fn stored_index(pandas: &str) -> Option<StoredIndex> {
    let metadata: Value = serde_json::from_str(pandas).ok()?;
    let levels = metadata.get("index_columns")?.as_array()?;
    let [level] = levels.as_slice() else {
        return None;
    };

    if let Some(name) = level.as_str() {
        return Some(StoredIndex::Column(name.to_string()));
    }
    if level.get("kind")?.as_str()? == "range" {
        return Some(StoredIndex::Range {
            start: level.get("start")?.as_i64()?,
            step: level.get("step")?.as_i64()?,
        });
    }
    None
}

fn integer_row_ids(column: &ArrayRef) -> Option<Vec<usize>> {
    if !column.data_type().is_integer() || column.null_count() > 0 {
        return None;
    }
    let values = cast(column.as_ref(), &DataType::Int64).ok()?;
    values
        .as_any()
        .downcast_ref::<Int64Array>()?
        .values()
        .iter()
        .map(|&v| usize::try_from(v).ok())
        .collect()
}

fn range_row_ids(start: i64, step: i64, rows: usize) -> Option<Vec<usize>> {
    (0..rows)
        .map(|i| {
            let offset = step.checked_mul(i64::try_from(i).ok()?)?;
            usize::try_from(start.checked_add(offset)?).ok()
        })
        .collect()
}

fn pandas_metadata(fields: &[FieldRef]) -> String {
    let columns: Vec<Value> = fields
        .iter()
        .map(|field| {
            let (pandas_type, numpy_type) = pandas_types(field.data_type());
            let name = if field.name() == PANDAS_INDEX_COLUMN {
                Value::Null
            } else {
                json!(field.name())
            };
            json!({
                "name": name,
                "field_name": field.name(),
                "pandas_type": pandas_type,
                "numpy_type": numpy_type,
                "metadata": Value::Null,
            })
        })
        .collect();

    json!({
        "index_columns": [PANDAS_INDEX_COLUMN],
        "column_indexes": [],
        "columns": columns,
        "creator": {"library": env!("CARGO_PKG_NAME"), "version": env!("CARGO_PKG_VERSION")},
        "pandas_version": "2.0.0",
    })
    .to_string()
}

const fn pandas_types(data_type: &DataType) -> (&'static str, &'static str) {
    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => ("unicode", "object"),
        DataType::Binary | DataType::LargeBinary => ("bytes", "object"),
        DataType::Boolean => ("bool", "bool"),
        DataType::Float64 => ("float64", "float64"),
        DataType::Float32 => ("float32", "float32"),
        DataType::Int64 => ("int64", "int64"),
        DataType::Int32 => ("int32", "int32"),
        DataType::Int16 => ("int16", "int16"),
        DataType::Int8 => ("int8", "int8"),
        DataType::UInt64 => ("uint64", "uint64"),
        DataType::UInt32 => ("uint32", "uint32"),
        DataType::UInt16 => ("uint16", "uint16"),
        DataType::UInt8 => ("uint8", "uint8"),
        _ => ("object", "object"),
    }
}

//! Arrow backed table builders
//!
//! Projections are evaluated eagerly once the delegate has run. Each column
//! becomes one Arrow array whose type follows the cells it produced: a column
//! whose cells all share one kind gets the matching Arrow type, a column that
//! mixes kinds is rendered as text.

use std::sync::Arc;

use arrow::array::{
    new_null_array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray,
    TimestampNanosecondArray, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use tracing::debug;

use pt_core::{ColumnConfiguration, TableConfiguration};
use pt_processing::{
    CellValue, ColumnProjection, TableBuilder, TableBuilderFactory, TableBuilderWithRowCount,
    TableDescriptor,
};

/// Collects one table's shape and presets until it is materialized
pub struct RecordBatchTableBuilder {
    descriptor: TableDescriptor,
    configurations: Vec<TableConfiguration>,
    default_configuration: Option<String>,
    row_count: usize,
    columns: Vec<(ColumnConfiguration, ColumnProjection)>,
}

impl RecordBatchTableBuilder {
    pub fn new(descriptor: TableDescriptor) -> Self {
        Self {
            descriptor,
            configurations: Vec::new(),
            default_configuration: None,
            row_count: 0,
            columns: Vec::new(),
        }
    }

    pub fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn upsert_configuration(&mut self, configuration: TableConfiguration) {
        match self
            .configurations
            .iter_mut()
            .find(|existing| existing.name == configuration.name)
        {
            Some(existing) => *existing = configuration,
            None => self.configurations.push(configuration),
        }
    }

    /// Evaluate every projection and assemble the record batch
    pub fn finish(self) -> Result<BuiltTable, ArrowError> {
        let mut fields = Vec::with_capacity(self.columns.len());
        let mut arrays = Vec::with_capacity(self.columns.len());
        let mut column_configurations = Vec::with_capacity(self.columns.len());

        for (column, projection) in self.columns {
            let cells: Vec<CellValue> = (0..self.row_count).map(|row| projection(row)).collect();
            let array = cells_to_array(&cells);
            fields.push(Field::new(
                column.metadata.name.clone(),
                array.data_type().clone(),
                true,
            ));
            arrays.push(array);
            column_configurations.push(column);
        }

        let options = RecordBatchOptions::new().with_row_count(Some(self.row_count));
        let batch = RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)?;
        debug!(
            table = %self.descriptor,
            rows = batch.num_rows(),
            columns = batch.num_columns(),
            "materialized table"
        );

        Ok(BuiltTable {
            descriptor: self.descriptor,
            configurations: self.configurations,
            default_configuration: self.default_configuration,
            columns: column_configurations,
            batch,
        })
    }
}

impl TableBuilder for RecordBatchTableBuilder {
    fn add_table_configuration(&mut self, configuration: TableConfiguration) {
        self.upsert_configuration(configuration);
    }

    fn set_default_table_configuration(&mut self, configuration: TableConfiguration) {
        self.default_configuration = Some(configuration.name.clone());
        self.upsert_configuration(configuration);
    }

    fn set_row_count(&mut self, row_count: usize) -> &mut dyn TableBuilderWithRowCount {
        self.row_count = row_count;
        self
    }
}

impl TableBuilderWithRowCount for RecordBatchTableBuilder {
    fn row_count(&self) -> usize {
        self.row_count
    }

    fn add_column(
        &mut self,
        column: ColumnConfiguration,
        projection: ColumnProjection,
    ) -> &mut dyn TableBuilderWithRowCount {
        self.columns.push((column, projection));
        self
    }
}

fn cell_type(cell: &CellValue) -> Option<DataType> {
    match cell {
        CellValue::Null => None,
        CellValue::Bool(_) => Some(DataType::Boolean),
        CellValue::Int(_) => Some(DataType::Int64),
        CellValue::UInt(_) => Some(DataType::UInt64),
        CellValue::Float(_) => Some(DataType::Float64),
        CellValue::Text(_) => Some(DataType::Utf8),
        CellValue::TimestampNs(_) => Some(DataType::Timestamp(TimeUnit::Nanosecond, None)),
    }
}

/// Arrow type shared by every non-null cell, `Utf8` when they disagree
fn column_type(cells: &[CellValue]) -> DataType {
    let mut common: Option<DataType> = None;
    for data_type in cells.iter().filter_map(cell_type) {
        match common {
            None => common = Some(data_type),
            Some(ref existing) if *existing != data_type => return DataType::Utf8,
            Some(_) => {}
        }
    }
    common.unwrap_or(DataType::Null)
}

fn cells_to_array(cells: &[CellValue]) -> ArrayRef {
    match column_type(cells) {
        DataType::Boolean => Arc::new(
            cells
                .iter()
                .map(|c| match c {
                    CellValue::Bool(v) => Some(*v),
                    _ => None,
                })
                .collect::<BooleanArray>(),
        ),
        DataType::Int64 => Arc::new(
            cells
                .iter()
                .map(|c| match c {
                    CellValue::Int(v) => Some(*v),
                    _ => None,
                })
                .collect::<Int64Array>(),
        ),
        DataType::UInt64 => Arc::new(
            cells
                .iter()
                .map(|c| match c {
                    CellValue::UInt(v) => Some(*v),
                    _ => None,
                })
                .collect::<UInt64Array>(),
        ),
        DataType::Float64 => Arc::new(
            cells
                .iter()
                .map(|c| match c {
                    CellValue::Float(v) => Some(*v),
                    _ => None,
                })
                .collect::<Float64Array>(),
        ),
        DataType::Timestamp(_, _) => Arc::new(
            cells
                .iter()
                .map(|c| match c {
                    CellValue::TimestampNs(v) => Some(*v),
                    _ => None,
                })
                .collect::<TimestampNanosecondArray>(),
        ),
        DataType::Null => new_null_array(&DataType::Null, cells.len()),
        _ => Arc::new(
            cells
                .iter()
                .map(|c| match c {
                    CellValue::Null => None,
                    other => Some(other.to_string()),
                })
                .collect::<StringArray>(),
        ),
    }
}

/// A materialized table with the configurations it ships with
#[derive(Debug, Clone)]
pub struct BuiltTable {
    pub descriptor: TableDescriptor,
    pub configurations: Vec<TableConfiguration>,
    pub default_configuration: Option<String>,
    /// Column configurations in batch column order
    pub columns: Vec<ColumnConfiguration>,
    pub batch: RecordBatch,
}

impl BuiltTable {
    pub fn row_count(&self) -> usize {
        self.batch.num_rows()
    }

    /// The configuration set as default, or the first one added
    pub fn default_configuration(&self) -> Option<&TableConfiguration> {
        self.default_configuration
            .as_deref()
            .and_then(|name| self.configurations.iter().find(|c| c.name == name))
            .or_else(|| self.configurations.first())
    }

    /// Render the batch as a text table
    pub fn pretty(&self) -> Result<String, ArrowError> {
        Ok(arrow::util::pretty::pretty_format_batches(std::slice::from_ref(&self.batch))?.to_string())
    }
}

/// Hands out a fresh [`RecordBatchTableBuilder`] per table
#[derive(Default)]
pub struct RecordBatchBuilderFactory {
    builders: Vec<RecordBatchTableBuilder>,
}

impl RecordBatchBuilderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    pub fn builders(&self) -> &[RecordBatchTableBuilder] {
        &self.builders
    }

    /// Materialize every builder handed out, in creation order
    pub fn finish(self) -> Result<Vec<BuiltTable>, ArrowError> {
        self.builders
            .into_iter()
            .map(RecordBatchTableBuilder::finish)
            .collect()
    }
}

impl TableBuilderFactory for RecordBatchBuilderFactory {
    fn create(&mut self, descriptor: &TableDescriptor) -> &mut dyn TableBuilder {
        self.builders.push(RecordBatchTableBuilder::new(descriptor.clone()));
        let index = self.builders.len() - 1;
        &mut self.builders[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use pt_core::ColumnMetadata;
    use pt_processing::builder::project;
    use uuid::Uuid;

    fn descriptor(name: &str) -> TableDescriptor {
        TableDescriptor::new(Uuid::new_v4(), name, "", "Test")
    }

    fn column(name: &str) -> ColumnConfiguration {
        ColumnConfiguration::new(ColumnMetadata::new(Uuid::new_v4(), name))
    }

    #[test]
    fn test_typed_columns() {
        let mut builder = RecordBatchTableBuilder::new(descriptor("Samples"));
        builder
            .set_row_count(3)
            .add_column(column("Index"), project(|row| CellValue::UInt(row as u64)))
            .add_column(column("Time"), project(|row| CellValue::TimestampNs(row as i64 * 10)))
            .add_column(
                column("Load"),
                project(|row| if row == 1 { CellValue::Null } else { CellValue::Float(0.5) }),
            );

        let table = builder.finish().unwrap();
        let schema = table.batch.schema();
        assert_eq!(table.row_count(), 3);
        assert_eq!(schema.field(0).data_type(), &DataType::UInt64);
        assert_eq!(
            schema.field(1).data_type(),
            &DataType::Timestamp(TimeUnit::Nanosecond, None)
        );
        assert_eq!(schema.field(2).data_type(), &DataType::Float64);
        assert_eq!(table.batch.column(2).null_count(), 1);
        assert_eq!(table.columns.len(), 3);
    }

    #[test]
    fn test_mixed_column_becomes_text() {
        let mut builder = RecordBatchTableBuilder::new(descriptor("Stats"));
        builder.set_row_count(2).add_column(
            column("Value"),
            project(|row| if row == 0 { CellValue::Int(7) } else { CellValue::from("seven") }),
        );

        let table = builder.finish().unwrap();
        let values = table
            .batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(values.value(0), "7");
        assert_eq!(values.value(1), "seven");
    }

    #[test]
    fn test_row_count_without_columns() {
        let mut builder = RecordBatchTableBuilder::new(descriptor("Empty"));
        builder.set_row_count(4);
        let table = builder.finish().unwrap();
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.batch.num_columns(), 0);
    }

    #[test]
    fn test_default_configuration() {
        let mut builder = RecordBatchTableBuilder::new(descriptor("Configured"));
        builder.add_table_configuration(TableConfiguration::new("First"));
        builder.set_default_table_configuration(TableConfiguration::new("Second"));
        builder.add_table_configuration(TableConfiguration::new("Second"));

        let table = builder.finish().unwrap();
        assert_eq!(table.configurations.len(), 2);
        assert_eq!(table.default_configuration().map(|c| c.name.as_str()), Some("Second"));
    }

    #[test]
    fn test_factory_hands_out_fresh_builders() {
        let mut factory = RecordBatchBuilderFactory::new();
        let first = descriptor("A");
        let second = descriptor("B");
        factory.create(&first).set_row_count(1);
        factory.create(&second).set_row_count(2);

        assert_eq!(factory.len(), 2);
        let tables = factory.finish().unwrap();
        assert_eq!(tables[0].descriptor, first);
        assert_eq!(tables[0].row_count(), 1);
        assert_eq!(tables[1].descriptor, second);
        assert_eq!(tables[1].row_count(), 2);
    }

    #[test]
    fn test_pretty_output_names_columns() {
        let mut builder = RecordBatchTableBuilder::new(descriptor("Pretty"));
        builder
            .set_row_count(1)
            .add_column(column("Process"), project(|_| CellValue::from("init")));
        let rendered = builder.finish().unwrap().pretty().unwrap();
        assert!(rendered.contains("Process"));
        assert!(rendered.contains("init"));
    }
}

//! Demo processor
//! Generates a synthetic CPU sampling trace to exercise the engine end to end

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use pt_core::{
    AggregationMode, AggregationOverTime, ChartType, ColumnConfiguration, ColumnMetadata,
    ConfigurationError, HighlightEntry, ProcessorOptions, ReservedColumn, SortOrder,
    TableConfiguration, TextAlignment, UiHints,
};
use pt_processing::builder::{build_action, project};
use pt_processing::{
    ApplicationEnvironment, BuildTableAction, CancellationToken, CellValue, ColumnProjection,
    CustomDataProcessor, DataCookerPath, DataSourceInfo, DefaultProcessorEnvironment,
    ProcessingContext, ProcessingOutcome, ProcessorCore, Progress, TableDescriptor,
};

const CPU_SAMPLING_TABLE: Uuid = Uuid::from_u128(0x6a1f0c52_7d3e_4b8a_9c41_0e5d2b7f3a01);
const PROCESS_SUMMARY_TABLE: Uuid = Uuid::from_u128(0x6a1f0c52_7d3e_4b8a_9c41_0e5d2b7f3a02);
const TRACE_STATS_TABLE: Uuid = Uuid::from_u128(0x6a1f0c52_7d3e_4b8a_9c41_0e5d2b7f3a03);
const PROCESSOR_OPTIONS_TABLE: Uuid = Uuid::from_u128(0x6a1f0c52_7d3e_4b8a_9c41_0e5d2b7f3a04);

const PROCESS_COLUMN: Uuid = Uuid::from_u128(0x2c9b4e10_1f6a_4d3c_8e27_5b0a9d4c6e01);
const THREAD_COLUMN: Uuid = Uuid::from_u128(0x2c9b4e10_1f6a_4d3c_8e27_5b0a9d4c6e02);
const CPU_COLUMN: Uuid = Uuid::from_u128(0x2c9b4e10_1f6a_4d3c_8e27_5b0a9d4c6e03);
const TIMESTAMP_COLUMN: Uuid = Uuid::from_u128(0x2c9b4e10_1f6a_4d3c_8e27_5b0a9d4c6e04);
const WEIGHT_COLUMN: Uuid = Uuid::from_u128(0x2c9b4e10_1f6a_4d3c_8e27_5b0a9d4c6e05);
const SAMPLE_COUNT_COLUMN: Uuid = Uuid::from_u128(0x2c9b4e10_1f6a_4d3c_8e27_5b0a9d4c6e06);
const KEY_COLUMN: Uuid = Uuid::from_u128(0x2c9b4e10_1f6a_4d3c_8e27_5b0a9d4c6e07);
const VALUE_COLUMN: Uuid = Uuid::from_u128(0x2c9b4e10_1f6a_4d3c_8e27_5b0a9d4c6e08);

const SOURCE_PARSER: &str = "DemoTraceSource";
const PROCESSES: [&str; 4] = ["System", "explorer.exe", "svchost.exe", "ptengine"];
const SAMPLE_INTERVAL_NS: i64 = 1_000_000;
const BATCHES: usize = 10;

/// Sampled CPU usage, one row per sample
pub fn cpu_sampling_table() -> TableDescriptor {
    TableDescriptor::new(
        CPU_SAMPLING_TABLE,
        "CPU Usage (Sampled)",
        "CPU samples with the process and thread that was running",
        "Computation",
    )
    .with_required_cooker(DataCookerPath::for_source(SOURCE_PARSER, "CpuSampleCooker"))
}

/// Samples and weight per process
pub fn process_summary_table() -> TableDescriptor {
    TableDescriptor::new(
        PROCESS_SUMMARY_TABLE,
        "Process Summary",
        "Sample count and total weight of every process",
        "Computation",
    )
    .with_required_cooker(DataCookerPath::for_source(SOURCE_PARSER, "CpuSampleCooker"))
}

pub fn trace_stats_table() -> TableDescriptor {
    TableDescriptor::new(
        TRACE_STATS_TABLE,
        "Trace Statistics",
        "Summary of the processed trace",
        "System Configuration",
    )
    .metadata()
}

pub fn processor_options_table() -> TableDescriptor {
    TableDescriptor::new(
        PROCESSOR_OPTIONS_TABLE,
        "Processor Options",
        "Options the trace was processed with",
        "System Configuration",
    )
    .metadata()
}

/// One synthetic CPU sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuSample {
    pub timestamp_ns: i64,
    pub cpu: u32,
    pub process: &'static str,
    pub thread_id: u32,
    pub weight_ns: i64,
}

impl CpuSample {
    fn synthetic(index: usize) -> Self {
        let process_index = (index * 7 + index / 3) % PROCESSES.len();
        let i = index as i64;
        Self {
            timestamp_ns: i * SAMPLE_INTERVAL_NS,
            cpu: (index % 8) as u32,
            process: PROCESSES[process_index],
            thread_id: 1000 + process_index as u32 * 4 + (index % 4) as u32,
            weight_ns: SAMPLE_INTERVAL_NS - (i % 5) * 50_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSummary {
    pub process: String,
    pub samples: u64,
    pub weight_ns: i64,
}

/// State filled in by processing and read by the build delegates
#[derive(Debug, Default)]
struct DemoTrace {
    samples: Vec<CpuSample>,
    summaries: Vec<ProcessSummary>,
    options: Vec<(String, String)>,
    application_name: String,
}

/// Demo processor that generates synthetic CPU samples
pub struct DemoTraceProcessor {
    sample_count: usize,
    started_at: DateTime<Utc>,
    trace: Arc<RwLock<DemoTrace>>,
    info: DataSourceInfo,
}

impl DemoTraceProcessor {
    pub const NAME: &'static str = "demo-trace";

    pub fn new(sample_count: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            sample_count,
            started_at,
            trace: Arc::new(RwLock::new(DemoTrace::default())),
            info: DataSourceInfo::empty(started_at),
        }
    }

    /// Descriptors of every table this processor can build
    pub fn descriptors() -> [TableDescriptor; 4] {
        [
            cpu_sampling_table(),
            process_summary_table(),
            trace_stats_table(),
            processor_options_table(),
        ]
    }

    /// Table map with build delegates reading the processed trace
    pub fn tables(&self) -> Result<Vec<(TableDescriptor, BuildTableAction)>, ConfigurationError> {
        Ok(vec![
            (cpu_sampling_table(), self.cpu_sampling_action()?),
            (process_summary_table(), self.process_summary_action()?),
            (trace_stats_table(), self.trace_stats_action()),
            (processor_options_table(), self.processor_options_action()),
        ])
    }

    /// Wrap this processor with its table map
    pub fn into_processor(
        self,
        options: ProcessorOptions,
        application_environment: Arc<dyn ApplicationEnvironment>,
    ) -> Result<CustomDataProcessor<Self>, ConfigurationError> {
        let tables = self.tables()?;
        Ok(CustomDataProcessor::new(
            options,
            application_environment,
            Arc::new(DefaultProcessorEnvironment::new(Self::NAME)),
            tables,
            self,
        ))
    }

    /// Samples generated so far
    pub fn generated_samples(&self) -> usize {
        self.trace.read().samples.len()
    }

    fn cpu_sampling_action(&self) -> Result<BuildTableAction, ConfigurationError> {
        let by_process = utilization_by_process()?;
        let by_cpu = timeline_by_cpu()?;
        let trace = self.trace.clone();

        Ok(build_action(move |builder| {
            let samples: Arc<[CpuSample]> = trace.read().samples.iter().cloned().collect();
            builder.add_table_configuration(by_cpu.clone());
            builder.set_default_table_configuration(by_process.clone());
            builder
                .set_row_count(samples.len())
                .add_column(process_column(), rows(&samples, |s| s.process.into()))
                .add_column(thread_column(), rows(&samples, |s| CellValue::UInt(s.thread_id.into())))
                .add_column(cpu_column(), rows(&samples, |s| CellValue::UInt(s.cpu.into())))
                .add_column(timestamp_column(), rows(&samples, |s| CellValue::TimestampNs(s.timestamp_ns)))
                .add_column(weight_column(), rows(&samples, |s| CellValue::Int(s.weight_ns)));
        }))
    }

    fn process_summary_action(&self) -> Result<BuildTableAction, ConfigurationError> {
        let mut by_weight = TableConfiguration::new("By Weight");
        by_weight.chart_type = ChartType::StackedBars;
        by_weight.description = Some("Processes ranked by CPU weight".to_string());
        let by_weight = by_weight.with_columns([
            process_column(),
            ReservedColumn::Pivot.column(),
            sample_count_column(),
            ReservedColumn::Graph.column(),
            weight_column(),
        ])?;
        let trace = self.trace.clone();

        Ok(build_action(move |builder| {
            let summaries: Arc<[ProcessSummary]> = trace.read().summaries.iter().cloned().collect();
            builder.set_default_table_configuration(by_weight.clone());
            builder
                .set_row_count(summaries.len())
                .add_column(process_column(), rows(&summaries, |s| s.process.clone().into()))
                .add_column(sample_count_column(), rows(&summaries, |s| CellValue::UInt(s.samples)))
                .add_column(weight_column(), rows(&summaries, |s| CellValue::Int(s.weight_ns)));
        }))
    }

    fn trace_stats_action(&self) -> BuildTableAction {
        let trace = self.trace.clone();

        build_action(move |builder| {
            let stats: Arc<[(String, CellValue)]> = {
                let trace = trace.read();
                let first = trace.samples.first().map_or(0, |s| s.timestamp_ns);
                let last = trace.samples.last().map_or(0, |s| s.timestamp_ns);
                vec![
                    ("Application".to_string(), trace.application_name.clone().into()),
                    ("Samples".to_string(), CellValue::UInt(trace.samples.len() as u64)),
                    ("Processes".to_string(), CellValue::UInt(trace.summaries.len() as u64)),
                    ("First Event".to_string(), CellValue::TimestampNs(first)),
                    ("Last Event".to_string(), CellValue::TimestampNs(last)),
                ]
                .into()
            };
            builder
                .set_row_count(stats.len())
                .add_column(key_column(), rows(&stats, |(key, _)| key.clone().into()))
                .add_column(value_column(), rows(&stats, |(_, value)| value.clone()));
        })
    }

    fn processor_options_action(&self) -> BuildTableAction {
        let trace = self.trace.clone();

        build_action(move |builder| {
            let options: Arc<[(String, String)]> = trace.read().options.iter().cloned().collect();
            builder
                .set_row_count(options.len())
                .add_column(key_column(), rows(&options, |(option, _)| option.clone().into()))
                .add_column(value_column(), rows(&options, |(_, value)| value.clone().into()));
        })
    }
}

#[async_trait]
impl ProcessorCore for DemoTraceProcessor {
    async fn process_core(
        &mut self,
        context: &ProcessingContext<'_>,
        progress: &dyn Progress,
        cancel: &CancellationToken,
    ) -> anyhow::Result<ProcessingOutcome> {
        let total = self.sample_count;
        let batch_size = (total / BATCHES).max(1);
        let mut samples = Vec::with_capacity(total);

        while samples.len() < total {
            if cancel.is_cancelled() {
                info!(generated = samples.len(), total, "sample generation cancelled");
                return Ok(ProcessingOutcome::Cancelled);
            }
            let start = samples.len();
            let end = (start + batch_size).min(total);
            samples.extend((start..end).map(CpuSample::synthetic));
            progress.report((end * 100 / total) as u8);
            tokio::task::yield_now().await;
        }

        let summaries = if context.is_table_enabled(&process_summary_table()) {
            summarize(&samples)
        } else {
            Vec::new()
        };
        debug!(samples = samples.len(), processes = summaries.len(), "generated demo trace");

        let first = samples.first().map_or(0, |s| s.timestamp_ns);
        let last = samples.last().map_or(0, |s| s.timestamp_ns);
        self.info = DataSourceInfo::new(first, last, self.started_at)?;

        let mut trace = self.trace.write();
        trace.samples = samples;
        trace.summaries = summaries;
        trace.options = context
            .options
            .iter()
            .map(|instance| (instance.option.to_string(), instance.value.clone()))
            .chain(
                context
                    .options
                    .plugin_options()
                    .iter()
                    .map(|option| (option.guid.to_string(), option.value.to_string())),
            )
            .collect();
        trace.application_name = context.application_environment.application_name().to_string();

        Ok(ProcessingOutcome::Completed)
    }

    fn data_source_info(&self) -> DataSourceInfo {
        self.info
    }
}

fn summarize(samples: &[CpuSample]) -> Vec<ProcessSummary> {
    let mut by_process: BTreeMap<&str, ProcessSummary> = BTreeMap::new();
    for sample in samples {
        let summary = by_process.entry(sample.process).or_insert_with(|| ProcessSummary {
            process: sample.process.to_string(),
            samples: 0,
            weight_ns: 0,
        });
        summary.samples += 1;
        summary.weight_ns += sample.weight_ns;
    }

    let mut summaries: Vec<ProcessSummary> = by_process.into_values().collect();
    summaries.sort_by(|a, b| b.weight_ns.cmp(&a.weight_ns).then_with(|| a.process.cmp(&b.process)));
    summaries
}

/// Projection reading one field of a shared row snapshot
fn rows<T, F>(rows: &Arc<[T]>, cell: F) -> ColumnProjection
where
    T: Send + Sync + 'static,
    F: Fn(&T) -> CellValue + Send + Sync + 'static,
{
    let rows = rows.clone();
    project(move |row| rows.get(row).map_or(CellValue::Null, &cell))
}

fn column(guid: Uuid, name: &str, description: &str) -> ColumnConfiguration {
    ColumnConfiguration::new(ColumnMetadata::new(guid, name).with_description(description))
}

fn process_column() -> ColumnConfiguration {
    column(PROCESS_COLUMN, "Process", "Image name of the running process").with_hints(UiHints {
        width: 160,
        ..Default::default()
    })
}

fn thread_column() -> ColumnConfiguration {
    column(THREAD_COLUMN, "Thread", "Id of the running thread").with_hints(UiHints {
        text_alignment: TextAlignment::Right,
        ..Default::default()
    })
}

fn cpu_column() -> ColumnConfiguration {
    column(CPU_COLUMN, "CPU", "Processor the sample was taken on").with_hints(UiHints {
        width: 40,
        text_alignment: TextAlignment::Right,
        ..Default::default()
    })
}

fn timestamp_column() -> ColumnConfiguration {
    column(TIMESTAMP_COLUMN, "Timestamp", "Time of the sample").with_hints(UiHints {
        sort_priority: 1,
        sort_order: SortOrder::Ascending,
        cell_format: Some("N".to_string()),
        ..Default::default()
    })
}

fn weight_column() -> ColumnConfiguration {
    column(WEIGHT_COLUMN, "Weight", "CPU time the sample stands for").with_hints(UiHints {
        text_alignment: TextAlignment::Right,
        sort_order: SortOrder::Descending,
        aggregation_mode: AggregationMode::Sum,
        ..Default::default()
    })
}

fn sample_count_column() -> ColumnConfiguration {
    column(SAMPLE_COUNT_COLUMN, "Count", "Number of samples").with_hints(UiHints {
        aggregation_mode: AggregationMode::Sum,
        ..Default::default()
    })
}

fn key_column() -> ColumnConfiguration {
    column(KEY_COLUMN, "Name", "Entry name")
}

fn value_column() -> ColumnConfiguration {
    column(VALUE_COLUMN, "Value", "Entry value")
}

fn utilization_by_process() -> Result<TableConfiguration, ConfigurationError> {
    let mut configuration = TableConfiguration::new("Utilization by Process");
    configuration.chart_type = ChartType::StackedLine;
    configuration.aggregation_over_time = AggregationOverTime::Rate;
    configuration.graph_filter_top_value = 10;
    configuration.description = Some("CPU weight per process over time".to_string());
    configuration.set_columns([
        process_column(),
        ReservedColumn::Pivot.column(),
        thread_column(),
        cpu_column(),
        timestamp_column(),
        ReservedColumn::Graph.column(),
        weight_column(),
    ])?;
    configuration.add_column_role("StartTime", &timestamp_column())?;
    configuration.add_column_role("Duration", &weight_column())?;
    configuration.set_highlight_entries([HighlightEntry {
        start_time_column: Some(TIMESTAMP_COLUMN),
        duration_column: Some(WEIGHT_COLUMN),
        ..HighlightEntry::new("[Process]:=\"System\"", [0xd0, 0x40, 0x40, 0xff])
    }]);
    Ok(configuration)
}

fn timeline_by_cpu() -> Result<TableConfiguration, ConfigurationError> {
    let mut configuration = TableConfiguration::new("Timeline by CPU");
    configuration.chart_type = ChartType::StackedBars;
    configuration.description = Some("Samples per processor with process columns frozen".to_string());
    configuration.set_columns([
        cpu_column(),
        ReservedColumn::Pivot.column(),
        ReservedColumn::LeftFreeze.column(),
        process_column(),
        thread_column(),
        ReservedColumn::RightFreeze.column(),
        timestamp_column(),
        ReservedColumn::Graph.column(),
        weight_column(),
    ])?;
    configuration.add_column_role("StartTime", &timestamp_column())?;
    Ok(configuration)
}

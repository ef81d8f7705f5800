//! Engine run loop
//!
//! One run takes a processor from construction to built tables:
//!
//! 1. enable the requested optional tables
//! 2. process, logging progress as it advances
//! 3. build every metadata table, then every enabled table
//! 4. materialize the builders into record batches
//!
//! Lifecycle events are published on the engine's [`EventBus`] as the run
//! goes.

use std::fmt;

use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

use pt_core::{EventBus, ProcessingEvent};
use pt_processing::{
    CancellationToken, CustomDataProcessor, DataSourceInfo, ProcessorCore, TableDescriptor,
};

use crate::config::EngineConfig;
use crate::record_batch_builder::{BuiltTable, RecordBatchBuilderFactory};
use crate::{EngineError, Result};

/// Picks a table by GUID or by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSelector {
    Guid(Uuid),
    /// Matched case-insensitively
    Name(String),
}

impl TableSelector {
    /// A GUID if the text parses as one, a name otherwise
    pub fn parse(text: &str) -> Self {
        match Uuid::parse_str(text.trim()) {
            Ok(guid) => TableSelector::Guid(guid),
            Err(_) => TableSelector::Name(text.trim().to_string()),
        }
    }

    pub fn matches(&self, descriptor: &TableDescriptor) -> bool {
        match self {
            TableSelector::Guid(guid) => descriptor.guid == *guid,
            TableSelector::Name(name) => descriptor.name.eq_ignore_ascii_case(name),
        }
    }
}

impl fmt::Display for TableSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSelector::Guid(guid) => write!(f, "{guid}"),
            TableSelector::Name(name) => f.write_str(name),
        }
    }
}

/// Which optional tables a run should build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineRequest {
    pub tables: Vec<TableSelector>,
    /// Build every optional table, ignoring `tables`
    pub enable_all: bool,
}

impl EngineRequest {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            tables: config
                .enabled_tables
                .iter()
                .map(|table| TableSelector::parse(table))
                .collect(),
            enable_all: false,
        }
    }
}

/// Result of a successful run
#[derive(Debug)]
pub struct EngineRun {
    pub data_source_info: DataSourceInfo,
    /// Metadata tables first, then enabled tables
    pub tables: Vec<BuiltTable>,
}

impl EngineRun {
    pub fn table(&self, name: &str) -> Option<&BuiltTable> {
        self.tables.iter().find(|t| t.descriptor.name == name)
    }

    pub fn metadata_tables(&self) -> impl Iterator<Item = &BuiltTable> {
        self.tables.iter().filter(|t| t.descriptor.is_metadata_table)
    }
}

/// Drives processors and materializes their tables
pub struct Engine {
    events: EventBus,
    progress_step: u8,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            events: EventBus::new(),
            progress_step: 10,
        }
    }

    /// Log progress each time it advances by `step` percent
    pub fn with_progress_step(mut self, step: u8) -> Self {
        self.progress_step = step.clamp(1, 100);
        self
    }

    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Run a processor to completion and build its tables
    pub async fn run<P: ProcessorCore>(
        &self,
        processor: &mut CustomDataProcessor<P>,
        request: &EngineRequest,
        cancel: &CancellationToken,
    ) -> Result<EngineRun> {
        let name = processor.processor_environment().processor_name().to_string();

        for descriptor in Self::resolve(processor, request)? {
            processor.enable_table(&descriptor)?;
        }
        self.events.publish(ProcessingEvent::Started {
            processor: name.clone(),
            enabled_tables: processor.enabled_tables().len(),
        });

        let (progress, updates) = watch::channel(0u8);
        let (result, ()) = tokio::join!(
            async {
                let result = processor.process(&progress, cancel).await;
                drop(progress);
                result
            },
            self.log_progress(&name, updates),
        );

        if let Err(err) = result {
            let outcome = if err.is_cancelled() { "cancelled" } else { "failed" };
            self.events.publish(ProcessingEvent::Finished {
                processor: name,
                outcome: outcome.to_string(),
            });
            return Err(err.into());
        }

        let data_source_info = processor.data_source_info()?;
        let mut factory = RecordBatchBuilderFactory::new();
        let metadata = processor.build_metadata_tables(&mut factory);
        let enabled = processor.build_enabled_tables(&mut factory)?;
        debug!(metadata, enabled, "dispatched table builds");

        let tables = factory.finish()?;
        for table in &tables {
            self.events.publish(ProcessingEvent::TableBuilt {
                table_guid: table.descriptor.guid,
                table_name: table.descriptor.name.clone(),
                is_metadata_table: table.descriptor.is_metadata_table,
                row_count: table.row_count(),
            });
        }

        info!(
            processor = %name,
            tables = tables.len(),
            duration_ns = data_source_info.duration_ns(),
            "run completed"
        );
        self.events.publish(ProcessingEvent::Finished {
            processor: name,
            outcome: "completed".to_string(),
        });

        Ok(EngineRun {
            data_source_info,
            tables,
        })
    }

    fn resolve<P: ProcessorCore>(
        processor: &CustomDataProcessor<P>,
        request: &EngineRequest,
    ) -> Result<Vec<TableDescriptor>> {
        if request.enable_all {
            return Ok(processor
                .tables()
                .keys()
                .filter(|d| !d.is_metadata_table)
                .cloned()
                .collect());
        }

        request
            .tables
            .iter()
            .map(|selector| {
                processor
                    .tables()
                    .keys()
                    .find(|d| selector.matches(d))
                    .cloned()
                    .ok_or_else(|| EngineError::UnknownTable(selector.to_string()))
            })
            .collect()
    }

    async fn log_progress(&self, processor: &str, mut updates: watch::Receiver<u8>) {
        let step = u16::from(self.progress_step);
        let mut next = step;
        while updates.changed().await.is_ok() {
            let percent = *updates.borrow_and_update();
            if u16::from(percent) < next && percent < 100 {
                continue;
            }
            info!(processor, percent, "processing");
            self.events.publish(ProcessingEvent::Progressed {
                processor: processor.to_string(),
                percent,
            });
            next = (u16::from(percent) / step + 1) * step;
        }
    }
}

//! Custom data processor
//!
//! A processor is split in two. [`ProcessorCore`] is what a plugin author
//! writes: the processing routine, the data source info and optionally how a
//! build delegate is invoked. [`CustomDataProcessor`] wraps a core and owns
//! everything the host relies on: the table map, the enabled set, lifecycle
//! state and table dispatch.
//!
//! ```text
//! Constructed --enable_table--> Configured --process--> Completed
//!                                                   \-> Cancelled
//!                                                   \-> Failed
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::{IndexMap, IndexSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

use pt_core::ProcessorOptions;

use crate::builder::{BuildTableAction, TableBuilder, TableBuilderFactory};
use crate::descriptor::TableDescriptor;
use crate::environment::{ApplicationEnvironment, ProcessorEnvironment};
use crate::progress::{MonotonicProgress, Progress};
use crate::source_info::DataSourceInfo;
use crate::ProcessingError;

/// How a processing routine ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingOutcome {
    Completed,
    /// The routine observed the cancellation token and stopped early
    Cancelled,
}

/// Lifecycle of a processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Constructed,
    Configured,
    Processing,
    Completed,
    Cancelled,
    Failed,
}

impl ProcessorState {
    /// Whether processing has run, whatever its outcome
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            ProcessorState::Completed | ProcessorState::Cancelled | ProcessorState::Failed
        )
    }
}

/// What a processing routine may see of its processor
pub struct ProcessingContext<'a> {
    pub options: &'a ProcessorOptions,
    pub application_environment: &'a dyn ApplicationEnvironment,
    pub processor_environment: &'a dyn ProcessorEnvironment,
    pub enabled_tables: &'a IndexSet<TableDescriptor>,
}

impl ProcessingContext<'_> {
    pub fn is_table_enabled(&self, descriptor: &TableDescriptor) -> bool {
        self.enabled_tables.contains(descriptor)
    }
}

/// Plugin-provided half of a processor
#[async_trait]
pub trait ProcessorCore: Send {
    /// Process the data source.
    ///
    /// Implementations should check `cancel` between batches of work and
    /// return [`ProcessingOutcome::Cancelled`] once they stop because of it.
    async fn process_core(
        &mut self,
        context: &ProcessingContext<'_>,
        progress: &dyn Progress,
        cancel: &CancellationToken,
    ) -> anyhow::Result<ProcessingOutcome>;

    /// Time range of the processed source. Only called after processing
    /// completed successfully.
    fn data_source_info(&self) -> DataSourceInfo;

    /// Populate `builder` for `descriptor`. The default runs the delegate.
    fn build_table_core(
        &mut self,
        _descriptor: &TableDescriptor,
        action: &BuildTableAction,
        builder: &mut dyn TableBuilder,
    ) {
        action(builder);
    }
}

/// A processor bound to its options, environments and table map
pub struct CustomDataProcessor<P> {
    options: ProcessorOptions,
    application_environment: Arc<dyn ApplicationEnvironment>,
    processor_environment: Arc<dyn ProcessorEnvironment>,
    tables: IndexMap<TableDescriptor, BuildTableAction>,
    enabled_tables: IndexSet<TableDescriptor>,
    state: ProcessorState,
    build_started: bool,
    core: P,
}

impl<P: ProcessorCore> CustomDataProcessor<P> {
    /// Create a processor.
    ///
    /// The order of `tables` is the order metadata tables are built in. A
    /// descriptor given twice keeps its first position and its last delegate.
    pub fn new<I>(
        options: ProcessorOptions,
        application_environment: Arc<dyn ApplicationEnvironment>,
        processor_environment: Arc<dyn ProcessorEnvironment>,
        tables: I,
        core: P,
    ) -> Self
    where
        I: IntoIterator<Item = (TableDescriptor, BuildTableAction)>,
    {
        Self {
            options,
            application_environment,
            processor_environment,
            tables: tables.into_iter().collect(),
            enabled_tables: IndexSet::new(),
            state: ProcessorState::Constructed,
            build_started: false,
            core,
        }
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    pub fn application_environment(&self) -> &Arc<dyn ApplicationEnvironment> {
        &self.application_environment
    }

    pub fn processor_environment(&self) -> &Arc<dyn ProcessorEnvironment> {
        &self.processor_environment
    }

    /// Every table this processor can build, with its delegate
    pub fn tables(&self) -> &IndexMap<TableDescriptor, BuildTableAction> {
        &self.tables
    }

    /// Optional tables the host asked for
    pub fn enabled_tables(&self) -> &IndexSet<TableDescriptor> {
        &self.enabled_tables
    }

    /// Registered metadata tables, in table map order
    pub fn metadata_tables(&self) -> impl Iterator<Item = &TableDescriptor> {
        self.tables.keys().filter(|d| d.is_metadata_table)
    }

    pub fn is_metadata_table(&self, descriptor: &TableDescriptor) -> bool {
        descriptor.is_metadata_table
            || self
                .tables
                .get_key_value(descriptor)
                .is_some_and(|(registered, _)| registered.is_metadata_table)
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    pub fn core(&self) -> &P {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut P {
        &mut self.core
    }

    pub fn into_core(self) -> P {
        self.core
    }

    /// Ask for an optional table to be built.
    ///
    /// Enabling a table twice has no further effect. Metadata tables are
    /// always built, so enabling one is accepted and ignored: it never enters
    /// the enabled set. Fails once table building has started.
    pub fn enable_table(&mut self, descriptor: &TableDescriptor) -> Result<(), ProcessingError> {
        if self.build_started {
            return Err(ProcessingError::TablesLocked);
        }

        if self.is_metadata_table(descriptor) {
            debug!(table = %descriptor, "metadata table is always built; enable ignored");
            return Ok(());
        }

        if self.enabled_tables.insert(descriptor.clone()) {
            info!(table = %descriptor, "enabled table");
        }
        if self.state == ProcessorState::Constructed {
            self.state = ProcessorState::Configured;
        }
        Ok(())
    }

    /// Run the processing routine.
    ///
    /// Progress reaching the host is clamped to `[0, 100]` and never
    /// decreases. A processor processes once; later calls fail with
    /// [`ProcessingError::AlreadyProcessed`].
    pub async fn process(
        &mut self,
        progress: &dyn Progress,
        cancel: &CancellationToken,
    ) -> Result<(), ProcessingError> {
        if !matches!(
            self.state,
            ProcessorState::Constructed | ProcessorState::Configured
        ) {
            return Err(ProcessingError::AlreadyProcessed);
        }

        let span = self.processor_environment.span();
        if cancel.is_cancelled() {
            self.state = ProcessorState::Cancelled;
            info!(parent: &span, "processing cancelled before it started");
            return Err(ProcessingError::ProcessingCancelled);
        }

        self.state = ProcessorState::Processing;
        info!(parent: &span, enabled_tables = self.enabled_tables.len(), "processing started");

        let progress = MonotonicProgress::new(progress);
        let context = ProcessingContext {
            options: &self.options,
            application_environment: self.application_environment.as_ref(),
            processor_environment: self.processor_environment.as_ref(),
            enabled_tables: &self.enabled_tables,
        };
        let result = self
            .core
            .process_core(&context, &progress, cancel)
            .instrument(span.clone())
            .await;

        match result {
            Ok(ProcessingOutcome::Completed) => {
                progress.report(100);
                self.state = ProcessorState::Completed;
                info!(parent: &span, "processing completed");
                Ok(())
            }
            Ok(ProcessingOutcome::Cancelled) => {
                self.state = ProcessorState::Cancelled;
                info!(parent: &span, progress = progress.last(), "processing cancelled");
                Err(ProcessingError::ProcessingCancelled)
            }
            Err(err)
                if matches!(
                    err.downcast_ref::<ProcessingError>(),
                    Some(ProcessingError::ProcessingCancelled)
                ) =>
            {
                self.state = ProcessorState::Cancelled;
                info!(parent: &span, progress = progress.last(), "processing cancelled");
                Err(ProcessingError::ProcessingCancelled)
            }
            Err(err) => {
                self.state = ProcessorState::Failed;
                warn!(parent: &span, error = %err, "processing failed");
                Err(ProcessingError::ProcessingFailed(err))
            }
        }
    }

    /// Time range of the processed source
    pub fn data_source_info(&self) -> Result<DataSourceInfo, ProcessingError> {
        match self.state {
            ProcessorState::Completed => Ok(self.core.data_source_info()),
            _ => Err(ProcessingError::NotYetProcessed),
        }
    }

    /// Build one table into a host supplied builder
    pub fn build_table(
        &mut self,
        descriptor: &TableDescriptor,
        builder: &mut dyn TableBuilder,
    ) -> Result<(), ProcessingError> {
        let Some((registered, action)) = self.tables.get_key_value(descriptor) else {
            return Err(ProcessingError::UnknownTable {
                guid: descriptor.guid,
                name: descriptor.name.clone(),
            });
        };

        if self.state != ProcessorState::Completed {
            warn!(table = %registered, state = ?self.state, "building table before processing completed");
        }
        self.build_started = true;

        debug!(table = %registered, "dispatching table build");
        self.core.build_table_core(registered, action, builder);
        Ok(())
    }

    /// Build every metadata table, one fresh builder per table.
    ///
    /// Returns the number of tables built.
    pub fn build_metadata_tables(&mut self, factory: &mut dyn TableBuilderFactory) -> usize {
        if self.state != ProcessorState::Completed {
            warn!(state = ?self.state, "building metadata tables before processing completed");
        }
        self.build_started = true;

        let mut built = 0;
        for (descriptor, action) in self.tables.iter().filter(|(d, _)| d.is_metadata_table) {
            let builder = factory.create(descriptor);
            debug!(table = %descriptor, "dispatching metadata table build");
            self.core.build_table_core(descriptor, action, builder);
            built += 1;
        }
        built
    }

    /// Build every enabled table, one fresh builder per table.
    ///
    /// Fails without dispatching anything if an enabled table is not
    /// registered.
    pub fn build_enabled_tables(
        &mut self,
        factory: &mut dyn TableBuilderFactory,
    ) -> Result<usize, ProcessingError> {
        if let Some(unknown) = self
            .enabled_tables
            .iter()
            .find(|d| !self.tables.contains_key(*d))
        {
            return Err(ProcessingError::UnknownTable {
                guid: unknown.guid,
                name: unknown.name.clone(),
            });
        }

        if self.state != ProcessorState::Completed {
            warn!(state = ?self.state, "building enabled tables before processing completed");
        }
        self.build_started = true;

        let mut built = 0;
        for enabled in &self.enabled_tables {
            if let Some((descriptor, action)) = self.tables.get_key_value(enabled) {
                let builder = factory.create(descriptor);
                debug!(table = %descriptor, "dispatching enabled table build");
                self.core.build_table_core(descriptor, action, builder);
                built += 1;
            }
        }
        Ok(built)
    }
}

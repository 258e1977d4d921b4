//! In-memory feature store.
//!
//! Backs the pipeline tests and embedding use cases. [`MemorySource`] can
//! yield injected per-record errors, which makes the batch-isolation
//! contract testable without crafting broken files.

use std::collections::VecDeque;

use crate::error::Result;
use crate::geometry::GeometryKind;
use crate::schema::{FeatureRecord, Schema};
use crate::store::{FeatureSink, FeatureSource};

/// Feature source reading from a prepared record list.
pub struct MemorySource {
    schema: Schema,
    geometry_kind: GeometryKind,
    records: VecDeque<Result<FeatureRecord>>,
}

impl MemorySource {
    /// Builds a source over prepared records; `Err` items are yielded
    /// in place as per-record read failures.
    #[must_use]
    pub fn new(
        schema: Schema,
        geometry_kind: GeometryKind,
        records: Vec<Result<FeatureRecord>>,
    ) -> Self {
        Self {
            schema,
            geometry_kind,
            records: records.into(),
        }
    }
}

impl FeatureSource for MemorySource {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn geometry_kind(&self) -> GeometryKind {
        self.geometry_kind
    }

    fn next_record(&mut self) -> Option<Result<FeatureRecord>> {
        self.records.pop_front()
    }
}

/// Feature sink collecting records into memory.
#[derive(Default)]
pub struct MemorySink {
    records: Vec<FeatureRecord>,
    finished: bool,
}

impl MemorySink {
    /// An empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The records written so far, in write order.
    #[must_use]
    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    /// `true` once [`FeatureSink::finish`] has run.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FeatureSink for MemorySink {
    fn write(&mut self, record: &FeatureRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

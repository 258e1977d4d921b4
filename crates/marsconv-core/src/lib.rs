//! `marsconv-core` is the core library for the `marsconv` project,
//! converting vector geospatial datasets between the WGS84 and GCJ-02
//! datums.
//!
//! This crate includes:
//! - **Coordinate Transform**: closed-form WGS84 -> GCJ-02 correction and
//!   the approximate inverse ([`transform`]).
//! - **Geometry Model**: the closed shape variant set the pipeline walks
//!   ([`geometry`]).
//! - **Schema Model**: field descriptors replicated from input to output
//!   datasets ([`schema`]).
//! - **Feature Store**: source/sink traits with `GeoJSON` and in-memory
//!   backends ([`store`]).
//! - **Conversion Pipeline**: the per-record batch loop with fault
//!   isolation ([`pipeline`]).

pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod schema;
pub mod store;
pub mod transform;

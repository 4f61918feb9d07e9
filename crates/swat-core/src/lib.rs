//! # SWAT Core
//!
//! Pure, I/O-free logic for the SWAT keyword comparator: CSV tokenizing,
//! header resolution, row normalization, multi-source reconciliation and
//! the chunk scheduler that keeps a single-threaded host responsive.
//!
//! This crate performs no file, network or terminal I/O. Hosts hand it CSV
//! text and receive typed records and [`models::ComparisonResult`]s back.
//!
//! ## Data Flow
//!
//! ```text
//! raw text ─▶ tokenize ─▶ schema (column map) ─▶ normalize ─▶ records
//!                                                               │
//!                  summary ◀── ComparisonResult[] ◀── reconcile ┘
//! ```
//!
//! Both [`normalize::NormalizeJob`] and [`reconcile::ReconcileJob`] can be
//! stepped slice by slice through [`schedule::ChunkCursor`].

pub mod error;
pub mod models;
pub mod normalize;
pub mod reconcile;
pub mod schedule;
pub mod schema;
pub mod summary;
pub mod tokenize;

pub use error::{CoreError, Result};
pub use models::{
    ComparisonInfo, ComparisonResult, KeywordStatus, Metric, Metrics, PertinenceRecord,
    PositionInfo, RawRecord, SourceDataset,
};
pub use reconcile::{reconcile, ReconcileJob, Reconciler};
pub use schedule::{ChunkCursor, ChunkedJob, Progress, DEFAULT_CHUNK_SIZE};
pub use schema::{ColumnMap, Field, Schema};

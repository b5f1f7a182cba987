//! # Contracts
//!
//! Interface contracts shared by every stage crate: the typed batch model,
//! the error taxonomy, the stage traits and the pipeline configuration.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Stage model
//! - A `DataSource` produces one `Batch`
//! - Each `Transform` maps a borrowed `Batch` to a new one
//! - A `DataSink` persists the final `Batch` and returns an `Ack`

mod batch;
mod config;
mod error;
mod object_store;
mod schema;
mod sink;
mod source;
mod stage;
mod transform;
mod value;

pub use batch::{Batch, Record};
pub use config::*;
pub use error::*;
pub use object_store::{LocalObjectStore, ObjectStore, StoreError};
pub use schema::{Column, Schema};
pub use sink::{Ack, DataSink, LocalDataSink};
pub use source::{DataSource, LocalDataSource};
pub use stage::Stage;
pub use transform::Transform;
pub use value::{ColumnType, Value, DATE_FORMAT};

//! Core library for the course-ingest command line application.
//!
//! A course workbook flows through three narrow stages: the spreadsheet
//! adapters under [`io`] decode it into rows, [`aggregate`] folds those rows
//! into a nested [`model::Module`], and a [`store::ModuleStore`] persists the
//! result keyed by its derived identifier. [`ingest`] wires the stages
//! together for the "submit course" and "list courses" operations.

pub mod aggregate;
pub mod error;
pub mod ingest;
pub mod io;
pub mod model;
pub mod store;

pub use error::{ErrorClass, Result, ToolError};

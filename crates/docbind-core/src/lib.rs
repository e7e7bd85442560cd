//! Core types for the docbind system.
//!
//! This crate holds the binding model (fixed, formula and chart bindings),
//! the working dataset, the binding store and the persisted settings
//! document. Nothing here performs I/O.

pub mod binding;
pub mod dataset;
pub mod dates;
pub mod enums;
pub mod settings;
pub mod store;
pub mod template;
pub mod validation;

pub use binding::{Binding, BindingMap, ChartSpec, END_DATE, START_DATE};
pub use dataset::{DateRange, Dataset, Record};
pub use enums::{ChartType, InvalidDatePolicy, Scale};
pub use settings::Settings;
pub use store::BindingStore;
pub use validation::ValidationError;

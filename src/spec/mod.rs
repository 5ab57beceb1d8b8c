//! Chart specification model
//!
//! The module is organized into submodules:
//!
//! - `types` - The specification schema: `ChartSpec`, `DataQuery`,
//!   `Encodings`, field references, and the closed enums
//! - `builder` - Shelf mutators: `assign`, `unassign`, `unassign_column`
//! - `transition` - Chart-type transitions: `with_chart_type`

pub mod builder;
pub mod transition;
pub mod types;

// Re-export all types for convenience
pub use types::*;

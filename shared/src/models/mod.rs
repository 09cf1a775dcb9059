//! Domain models for the Field Report platform

mod monitoring;
mod planting;
mod report;
mod side_by_side;
mod visit;

pub use monitoring::*;
pub use planting::*;
pub use report::*;
pub use side_by_side::*;
pub use visit::*;

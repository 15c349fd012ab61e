//! Job families, parameter building, and job control statuses.

pub mod family;
pub mod params;
pub mod status;

pub use family::{JobFamily, JobSpec};
pub use params::JobDefaults;
pub use status::JobControl;

pub mod detectors;
pub mod io;
pub mod metrics;
pub mod plot;
pub mod signal;

pub use detectors::*;
pub use metrics::*;
pub use signal::*;

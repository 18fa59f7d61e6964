//! Server module: the HTTP router and the process lifecycle that runs it
//! alongside the ingestion loop

pub mod lifecycle;
pub mod router;

pub use lifecycle::{DRAIN_TIMEOUT, Lifecycle, shutdown_signal};
pub use router::{REQUEST_TIMEOUT, build_router};

//! Service shell around the engine: clock, engine hub, scheduler, HTTP

pub mod clock;
pub mod http;
pub mod runtime;
pub mod scheduler;

pub use clock::*;
pub use http::*;
pub use runtime::*;
pub use scheduler::*;

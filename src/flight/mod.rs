//! Single-Flight Module
//!
//! Coalesces concurrent executions of the same keyed operation into one
//! underlying run whose outcome every caller shares.

mod dispatcher;
mod guard;

pub use dispatcher::SingleFlight;

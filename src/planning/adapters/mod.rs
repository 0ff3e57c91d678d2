//! Adapter implementations for planning repository and publisher ports.

pub mod memory;

mod noop;

pub use noop::NoopEventPublisher;

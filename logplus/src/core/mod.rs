//! Core event types shared with the processor chain.

mod event;

pub use event::EventDict;

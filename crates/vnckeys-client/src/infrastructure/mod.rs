//! Infrastructure layer: the concrete RFB network session and the
//! in-memory mock used by tests.

pub mod mock;
pub mod rfb;

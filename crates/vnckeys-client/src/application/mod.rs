//! Application layer: use cases for the key-replay client.

pub mod replay_keys;

pub use replay_keys::{
    dispatch_sequence, run_session, RfbSession, SessionConnector, SessionError,
};

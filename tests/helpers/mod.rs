//! Test helpers module
//!
//! In-memory fakes for the two capability contracts plus builders for test
//! data. The fakes carry the same per-row semantics as the PostgreSQL
//! repository and the teloxide client, so the job services can be exercised
//! end to end without external infrastructure.

// Each test binary uses a different subset of the helpers.
#![allow(dead_code)]

pub mod memory_store;
pub mod script_client;
pub mod test_data;

pub use memory_store::MemoryGroupStore;
pub use script_client::{ScriptClient, SendGate};
pub use test_data::*;

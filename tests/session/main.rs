//! Session Integration Tests
//!
//! End-to-end behavior of sessions, the action wrapper and remote flush,
//! driven through the public `restore` API.

mod common;

mod action_flow;
mod scenarios;
mod wire_format;

//! Request handling over RESP
//!
//! `resp` holds the frame codec. `command` decodes a request frame into one of
//! the per-command types below, which call the store, append the audit record
//! once the store call has returned, and build the reply.

pub mod add;
pub mod command;
pub mod delete;
pub mod exists;
pub mod get;
pub mod list;
pub mod log;
pub mod ping;
pub mod resp;
pub mod update;

pub use command::Command;
pub use resp::{Frame, FrameError, Parser};

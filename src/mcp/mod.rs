//! Model Context Protocol server exposing the metadata store to assistants.

pub mod prompts;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;

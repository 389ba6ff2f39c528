//! Control socket transport: server and client halves.

mod client;
mod server;

pub use client::ControlClient;
pub use server::{BoundServer, ControlServer};

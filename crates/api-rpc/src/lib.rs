//! JSON-RPC API Layer
//!
//! Implements the JSON-RPC 2.0 server for the Waitline queue engine. The
//! engine never talks to users or notification channels itself; this layer
//! is where rate limiting, the admin capability check, and notification
//! dispatch happen.

pub mod error;
pub mod handler;
pub mod notify;
pub mod rate_limiter;
pub mod server;
pub mod types;

pub use notify::{LogNotifier, Notifier};
pub use server::{RpcServer, RpcServerConfig};

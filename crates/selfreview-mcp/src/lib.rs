//! MCP (Model Context Protocol) server for selfreview.
//!
//! This crate implements the MCP server that exposes the pull request tools
//! to AI assistants over newline-delimited JSON-RPC on stdio.

pub mod handlers;
pub mod protocol;
pub mod server;
pub mod transport;

#[cfg(test)]
mod testing;

pub use handlers::ToolHandler;
pub use server::McpServer;
pub use transport::{StdioTransport, Transport};

//! Transport layer for MCP JSON-RPC communication.
//!
//! MCP uses newline-delimited JSON over stdin/stdout. Reads are async so the
//! server loop can race them against a shutdown signal.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

use crate::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

/// Message that can be received from the client.
#[derive(Debug)]
pub enum IncomingMessage {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
}

/// Line-oriented JSON-RPC transport over any async reader/writer pair.
pub struct Transport<R, W> {
    reader: R,
    writer: W,
}

/// Transport bound to the process stdin/stdout.
pub type StdioTransport = Transport<BufReader<Stdin>, Stdout>;

impl StdioTransport {
    /// Create a transport using stdin/stdout.
    pub fn stdio() -> Self {
        Transport::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Transport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a transport with custom reader/writer.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Consume the transport, returning the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Read a single JSON-RPC message from the transport.
    ///
    /// Blank lines are skipped. Returns `Ok(None)` on EOF and an
    /// [`io::ErrorKind::InvalidData`] error for lines that are not JSON-RPC.
    pub async fn read_message(&mut self) -> io::Result<Option<IncomingMessage>> {
        let mut line = String::new();

        loop {
            line.clear();
            if self.reader.read_line(&mut line).await? == 0 {
                return Ok(None);
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            tracing::debug!("Received: {}", trimmed);
            return parse_message(trimmed).map(Some);
        }
    }

    /// Write a JSON-RPC response to the transport.
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        let json = serde_json::to_string(response).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("Serialization error: {}", e))
        })?;

        tracing::debug!("Sending: {}", json);

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }
}

fn parse_message(line: &str) -> io::Result<IncomingMessage> {
    // Requests carry an id, notifications don't
    if let Ok(request) = serde_json::from_str::<JsonRpcRequest>(line) {
        return Ok(IncomingMessage::Request(request));
    }

    if let Ok(notification) = serde_json::from_str::<JsonRpcNotification>(line) {
        return Ok(IncomingMessage::Notification(notification));
    }

    tracing::warn!("Failed to parse message: {}", line);
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("Invalid JSON-RPC message: {}", line),
    ))
}

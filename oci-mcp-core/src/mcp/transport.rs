//! MCP Transport Implementations
//!
//! Transports handle the I/O for MCP communication.

use super::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::error::{OciMcpError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};

/// One line read from the client
#[derive(Debug, Clone)]
pub enum Inbound {
    /// A well-formed request or notification
    Message(JsonRpcRequest),
    /// Text that is not a JSON-RPC message; the reason is kept for logs
    Malformed(String),
}

/// Transport trait for MCP communication
#[async_trait]
pub trait Transport: Send {
    /// Next inbound message; `None` once the peer has closed the stream
    async fn receive(&mut self) -> Result<Option<Inbound>>;

    /// Send a response through the transport
    async fn send(&mut self, response: &JsonRpcResponse) -> Result<()>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &mut T {
    async fn receive(&mut self) -> Result<Option<Inbound>> {
        (**self).receive().await
    }

    async fn send(&mut self, response: &JsonRpcResponse) -> Result<()> {
        (**self).send(response).await
    }
}

/// Decode one raw line. Blank lines yield `None`; bytes that are not UTF-8
/// or not JSON-RPC are reported as malformed.
fn decode_line(bytes: &[u8]) -> Option<Inbound> {
    let line = match std::str::from_utf8(bytes) {
        Ok(line) => line.trim(),
        Err(e) => return Some(Inbound::Malformed(format!("invalid UTF-8: {}", e))),
    };
    if line.is_empty() {
        return None;
    }
    Some(match serde_json::from_str(line) {
        Ok(request) => Inbound::Message(request),
        Err(e) => Inbound::Malformed(e.to_string()),
    })
}

/// Newline-delimited JSON over any buffered reader and writer
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

/// Newline-delimited JSON on stdin/stdout
pub type StdioTransport = LineTransport<BufReader<Stdin>, Stdout>;

impl LineTransport<BufReader<Stdin>, Stdout> {
    pub fn new() -> Self {
        Self::from_parts(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl Default for LineTransport<BufReader<Stdin>, Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> LineTransport<R, W> {
    pub fn from_parts(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

#[async_trait]
impl<R, W> Transport for LineTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn receive(&mut self) -> Result<Option<Inbound>> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if self.reader.read_until(b'\n', &mut buf).await? == 0 {
                return Ok(None);
            }
            if let Some(inbound) = decode_line(&buf) {
                return Ok(Some(inbound));
            }
        }
    }

    async fn send(&mut self, response: &JsonRpcResponse) -> Result<()> {
        let mut json = serde_json::to_vec(response)?;
        json.push(b'\n');

        self.writer
            .write_all(&json)
            .await
            .map_err(|e| OciMcpError::Other(format!("Failed to write response: {}", e)))?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// In-memory transport for testing
#[derive(Debug, Default)]
pub struct MemoryTransport {
    lines: VecDeque<Vec<u8>>,
    responses: Vec<JsonRpcResponse>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a request to be received
    pub fn push_request(&mut self, request: &JsonRpcRequest) {
        self.lines
            .push_back(serde_json::to_vec(request).unwrap_or_default());
    }

    /// Queue a raw line, well-formed or not
    pub fn push_line(&mut self, line: impl Into<Vec<u8>>) {
        self.lines.push_back(line.into());
    }

    /// Get all sent responses
    pub fn responses(&self) -> &[JsonRpcResponse] {
        &self.responses
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn receive(&mut self) -> Result<Option<Inbound>> {
        while let Some(line) = self.lines.pop_front() {
            if let Some(inbound) = decode_line(&line) {
                return Ok(Some(inbound));
            }
        }
        Ok(None)
    }

    async fn send(&mut self, response: &JsonRpcResponse) -> Result<()> {
        self.responses.push(response.clone());
        Ok(())
    }
}

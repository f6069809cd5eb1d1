//! Line-delimited JSON transport.
//!
//! - Messages are UTF-8 encoded JSON, one per line
//! - Messages must not contain embedded newlines
//! - The input stream receives requests, the output stream carries responses
//! - Output is flushed after every message
//!
//! The transport is generic over any buffered async reader and async writer.
//! [`StdioTransport`] is the stdin/stdout instance used by the binary; tests
//! drive the same code with in-memory buffers.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::mcp::protocol::Response;

/// One line read from the input stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// A UTF-8 line with its terminator removed.
    Text(String),
    /// A line that was not valid UTF-8.
    Invalid(String),
}

/// A newline-delimited JSON transport over a reader/writer pair.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

/// Transport bound to the process's standard input and output.
pub type StdioTransport = LineTransport<BufReader<tokio::io::Stdin>, tokio::io::Stdout>;

impl StdioTransport {
    /// Creates a new stdio transport.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a transport over the given streams.
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Reads the next line.
    ///
    /// Returns `None` at end of stream. A line that is not valid UTF-8 is
    /// returned as [`Line::Invalid`] so the caller can reject that line alone.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the underlying stream fails.
    pub async fn read_line(&mut self) -> io::Result<Option<Line>> {
        let mut buf = Vec::new();
        let bytes_read = self.reader.read_until(b'\n', &mut buf).await?;

        if bytes_read == 0 {
            return Ok(None);
        }

        if buf.ends_with(b"\n") {
            buf.pop();
            if buf.ends_with(b"\r") {
                buf.pop();
            }
        }

        Ok(Some(match String::from_utf8(buf) {
            Ok(text) => Line::Text(text),
            Err(e) => Line::Invalid(e.to_string()),
        }))
    }

    /// Writes a response as one line and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_response(&mut self, response: &Response) -> io::Result<()> {
        let json = serde_json::to_string(response)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.write_raw(&json).await
    }

    /// Writes a raw JSON string with newline termination.
    async fn write_raw(&mut self, json: &str) -> io::Result<()> {
        debug_assert!(
            !json.contains('\n'),
            "JSON message must not contain embedded newlines"
        );

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        Ok(())
    }

    /// Consumes the transport and returns the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn reads_lines_and_strips_terminators() {
        let input: &[u8] = b"first\r\nsecond\nlast";
        let mut transport = LineTransport::new(input, Vec::new());

        assert_eq!(
            transport.read_line().await.unwrap(),
            Some(Line::Text("first".to_string()))
        );
        assert_eq!(
            transport.read_line().await.unwrap(),
            Some(Line::Text("second".to_string()))
        );
        assert_eq!(
            transport.read_line().await.unwrap(),
            Some(Line::Text("last".to_string()))
        );
        assert_eq!(transport.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalid_utf8_is_reported_per_line() {
        let input: &[u8] = b"\xff\xfe\n{}\n";
        let mut transport = LineTransport::new(input, Vec::new());

        assert!(matches!(
            transport.read_line().await.unwrap(),
            Some(Line::Invalid(_))
        ));
        assert_eq!(
            transport.read_line().await.unwrap(),
            Some(Line::Text("{}".to_string()))
        );
    }

    #[tokio::test]
    async fn writes_one_line_per_response() {
        let input: &[u8] = b"";
        let mut transport = LineTransport::new(input, Vec::new());
        let response = Response::success(
            Some(json!(1)),
            json!({"message": "hello\nworld", "nested": {"key": "value"}}),
        );

        transport.write_response(&response).await.unwrap();
        transport.write_response(&response).await.unwrap();

        let out = String::from_utf8(transport.into_writer()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(out.ends_with('\n'));
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["result"]["message"], "hello\nworld");
    }
}

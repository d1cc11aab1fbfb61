//! Newline-delimited JSON-RPC channel.
//!
//! One request is in flight at a time: [`JsonRpcChannel::request`] writes a
//! request and reads until the matching response arrives, answering server
//! requests and skipping notifications on the way. Callers serialize access
//! (the session keeps the channel behind an async mutex).
//!
//! Responses with an unexpected `id` are dropped. This happens when a
//! previous request was abandoned (timeout, cancellation) and its response
//! arrives late.

use super::error::{McpClientError, Result};
use super::protocol::{
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, JsonRpcResponseOut, METHOD_NOT_FOUND,
    MessageKind, classify_message,
};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, trace, warn};

pub struct JsonRpcChannel<R, W> {
    reader: BufReader<R>,
    writer: W,
    line: String,
}

impl<R, W> JsonRpcChannel<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
            line: String::new(),
        }
    }

    /// Send a request and wait for its result.
    pub async fn request(&mut self, method: &str, params: Option<Value>) -> Result<Value> {
        let request = JsonRpcRequest::new(method, params);
        self.write_message(&request).await?;

        loop {
            let message = self.read_message().await?;
            match classify_message(&message) {
                MessageKind::Response => {
                    let response: JsonRpcResponse = serde_json::from_value(message)?;
                    if response.id != Some(request.id) {
                        warn!(
                            "Dropping response with id {:?} while waiting for {} ({})",
                            response.id, request.id, method
                        );
                        continue;
                    }
                    if let Some(error) = response.error {
                        return Err(McpClientError::RpcError {
                            code: error.code,
                            message: error.message,
                        });
                    }
                    return Ok(response.result.unwrap_or(Value::Null));
                }
                MessageKind::IncomingRequest { id } => {
                    self.answer_server_request(id, &message).await?;
                }
                MessageKind::Notification => {
                    let method = message
                        .get("method")
                        .and_then(Value::as_str)
                        .unwrap_or("<none>");
                    debug!("Server notification: {}", method);
                }
            }
        }
    }

    /// Send a notification (no response expected).
    pub async fn notify(&mut self, method: &str, params: Option<Value>) -> Result<()> {
        self.write_message(&JsonRpcNotification::new(method, params))
            .await
    }

    /// Release the write half so the peer sees end-of-input.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }

    async fn answer_server_request(&mut self, id: Value, message: &Value) -> Result<()> {
        let method = message
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let response = match method {
            "ping" => JsonRpcResponseOut::result(id, json!({})),
            other => {
                debug!("Rejecting unsupported server request: {}", other);
                JsonRpcResponseOut::error(id, METHOD_NOT_FOUND, format!("Method not found: {}", other))
            }
        };
        self.write_message(&response).await
    }

    async fn write_message<T: Serialize>(&mut self, message: &T) -> Result<()> {
        let mut json = serde_json::to_string(message)?;
        trace!("MCP send: {}", json);
        json.push('\n');
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Next JSON message. Blank and non-JSON lines (stray server output)
    /// are skipped.
    async fn read_message(&mut self) -> Result<Value> {
        loop {
            self.line.clear();
            let bytes_read = self.reader.read_line(&mut self.line).await?;
            if bytes_read == 0 {
                return Err(McpClientError::TransportClosed);
            }
            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }
            trace!("MCP recv: {}", line);
            match serde_json::from_str::<Value>(line) {
                Ok(value) if value.is_object() => return Ok(value),
                _ => warn!("Skipping non-JSON-RPC output from server: {}", line),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{DuplexStream, ReadHalf, WriteHalf, duplex, split};

    type TestChannel = JsonRpcChannel<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

    struct FakeServer {
        lines: tokio::io::Lines<BufReader<ReadHalf<DuplexStream>>>,
        writer: WriteHalf<DuplexStream>,
    }

    impl FakeServer {
        async fn recv(&mut self) -> Option<Value> {
            let line = self.lines.next_line().await.unwrap()?;
            Some(serde_json::from_str(&line).unwrap())
        }

        async fn send_raw(&mut self, raw: &str) {
            self.writer.write_all(raw.as_bytes()).await.unwrap();
            self.writer.write_all(b"\n").await.unwrap();
        }

        async fn send(&mut self, value: Value) {
            self.send_raw(&value.to_string()).await;
        }
    }

    fn pair() -> (TestChannel, FakeServer) {
        let (client, server) = duplex(64 * 1024);
        let (client_read, client_write) = split(client);
        let (server_read, server_write) = split(server);
        (
            JsonRpcChannel::new(client_read, client_write),
            FakeServer {
                lines: BufReader::new(server_read).lines(),
                writer: server_write,
            },
        )
    }

    #[tokio::test]
    async fn request_returns_matching_result() {
        let (mut channel, mut server) = pair();
        let server_task = tokio::spawn(async move {
            let request = server.recv().await.unwrap();
            assert_eq!(request["method"], "tools/list");
            server
                .send(json!({"jsonrpc": "2.0", "id": request["id"], "result": {"tools": []}}))
                .await;
            server
        });

        let result = channel.request("tools/list", None).await.unwrap();
        assert_eq!(result, json!({"tools": []}));
        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn request_skips_noise_and_stale_responses() {
        let (mut channel, mut server) = pair();
        let server_task = tokio::spawn(async move {
            let request = server.recv().await.unwrap();
            server.send_raw("Server starting up...").await;
            server.send_raw("").await;
            server
                .send(json!({"jsonrpc": "2.0", "method": "notifications/message", "params": {"level": "info"}}))
                .await;
            server
                .send(json!({"jsonrpc": "2.0", "id": 999_999, "result": "stale"}))
                .await;
            server
                .send(json!({"jsonrpc": "2.0", "id": request["id"], "result": "fresh"}))
                .await;
            server
        });

        let result = channel.request("tools/call", None).await.unwrap();
        assert_eq!(result, json!("fresh"));
        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn server_ping_is_answered() {
        let (mut channel, mut server) = pair();
        let server_task = tokio::spawn(async move {
            let request = server.recv().await.unwrap();
            server
                .send(json!({"jsonrpc": "2.0", "id": "srv-1", "method": "ping"}))
                .await;
            let pong = server.recv().await.unwrap();
            assert_eq!(pong["id"], "srv-1");
            assert_eq!(pong["result"], json!({}));

            server
                .send(json!({"jsonrpc": "2.0", "id": "srv-2", "method": "sampling/createMessage"}))
                .await;
            let rejected = server.recv().await.unwrap();
            assert_eq!(rejected["error"]["code"], METHOD_NOT_FOUND);

            server
                .send(json!({"jsonrpc": "2.0", "id": request["id"], "result": null}))
                .await;
            server
        });

        let result = channel.request("initialize", Some(json!({}))).await.unwrap();
        assert_eq!(result, Value::Null);
        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn rpc_error_is_surfaced() {
        let (mut channel, mut server) = pair();
        let server_task = tokio::spawn(async move {
            let request = server.recv().await.unwrap();
            server
                .send(json!({
                    "jsonrpc": "2.0",
                    "id": request["id"],
                    "error": {"code": -32602, "message": "Unknown tool: nope"}
                }))
                .await;
            server
        });

        let err = channel.request("tools/call", None).await.unwrap_err();
        assert!(matches!(
            err,
            McpClientError::RpcError { code: -32602, ref message } if message == "Unknown tool: nope"
        ));
        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn closed_stream_is_transport_closed() {
        let (mut channel, server) = pair();
        drop(server);

        let err = channel.request("tools/list", None).await.unwrap_err();
        assert!(err.is_transport_failure());
    }

    #[tokio::test]
    async fn notify_has_no_id() {
        let (mut channel, mut server) = pair();
        channel
            .notify("notifications/initialized", None)
            .await
            .unwrap();
        let message = server.recv().await.unwrap();
        assert_eq!(message["method"], "notifications/initialized");
        assert!(message.get("id").is_none());
    }
}

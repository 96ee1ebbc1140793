//! msgpack-rpc channel over TCP.
//!
//! Requests are `[0, msgid, method, params]`, responses
//! `[1, msgid, error, result]`. Calls are split into `send` and `wait` so a
//! caller can submit a long-running command and wait for it separately.
//! Every wait is bounded by a deadline that covers the whole frame, not a
//! single socket read.

use crate::{PreflightError, Result};
use rmpv::Value;
use std::io::{self, BufReader, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};
use tracing::debug;

const REQUEST: u8 = 0;
const RESPONSE: u8 = 1;

/// Look up a string key in a msgpack map value
pub fn map_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value
        .as_map()?
        .iter()
        .find(|(k, _)| k.as_str() == Some(key))
        .map(|(_, v)| v)
}

/// Socket half that re-arms its read timeout from a frame deadline on
/// every refill
struct DeadlineStream {
    stream: TcpStream,
    deadline: Option<Instant>,
}

impl Read for DeadlineStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(deadline) = self.deadline {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(io::Error::new(ErrorKind::TimedOut, "rpc deadline elapsed"));
            }
            self.stream.set_read_timeout(Some(remaining))?;
        }
        self.stream.read(buf)
    }
}

/// Counts bytes handed to the decoder for the current frame
struct Counted<'a, R> {
    inner: &'a mut R,
    count: usize,
}

impl<R: Read> Read for Counted<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n;
        Ok(n)
    }
}

/// Blocking msgpack-rpc connection
pub struct RpcChannel {
    reader: BufReader<DeadlineStream>,
    writer: TcpStream,
    next_id: u32,
    /// Set once the stream position can no longer be trusted to sit on a
    /// frame boundary
    desynchronized: bool,
}

impl RpcChannel {
    /// Connect with timeout
    pub fn connect(addr: &str, timeout: Duration) -> Result<Self> {
        let sock_addr = resolve(addr)?;
        let stream = TcpStream::connect_timeout(&sock_addr, timeout)?;
        stream.set_nodelay(true)?;
        Self::from_stream(stream)
    }

    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        let writer = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(DeadlineStream {
                stream,
                deadline: None,
            }),
            writer,
            next_id: 0,
            desynchronized: false,
        })
    }

    /// Send a request and return its message id without waiting
    pub fn send(&mut self, method: &str, params: Vec<Value>) -> Result<u32> {
        self.ensure_synchronized()?;

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        let request = Value::Array(vec![
            Value::from(REQUEST),
            Value::from(id),
            Value::from(method),
            Value::Array(params),
        ]);

        let mut buf = Vec::new();
        rmpv::encode::write_value(&mut buf, &request)
            .map_err(|e| PreflightError::Protocol(format!("Failed to encode {}: {}", method, e)))?;
        self.writer.write_all(&buf)?;
        self.writer.flush()?;

        debug!(id, method, "rpc request sent");
        Ok(id)
    }

    /// Wait for the response to request `id`.
    ///
    /// Responses to other ids (late replies to calls that already timed out)
    /// are discarded.
    pub fn wait(&mut self, id: u32, method: &str, timeout: Duration) -> Result<Value> {
        self.ensure_synchronized()?;
        let deadline = Instant::now() + timeout;

        self.reader.get_mut().deadline = Some(deadline);
        let outcome = self.wait_until(id, method, timeout);
        self.reader.get_mut().deadline = None;
        outcome
    }

    fn wait_until(&mut self, id: u32, method: &str, timeout: Duration) -> Result<Value> {
        loop {
            let mut frame = Counted {
                inner: &mut self.reader,
                count: 0,
            };
            let decoded = rmpv::decode::read_value(&mut frame);
            let consumed = frame.count;

            let message = match decoded {
                Ok(message) => message,
                Err(e) => return Err(self.read_failure(e, consumed, method, timeout)),
            };

            let (msg_id, error, result) = parse_response(message).map_err(|e| {
                self.desynchronized = true;
                e
            })?;
            if msg_id != id {
                debug!(expected = id, received = msg_id, "discarding stale rpc response");
                continue;
            }

            if !error.is_nil() {
                return Err(PreflightError::Rpc {
                    method: method.to_string(),
                    message: describe_error(&error),
                });
            }

            debug!(id, method, "rpc response received");
            return Ok(result);
        }
    }

    /// Send a request and wait for its response
    pub fn call(&mut self, method: &str, params: Vec<Value>, timeout: Duration) -> Result<Value> {
        let id = self.send(method, params)?;
        self.wait(id, method, timeout)
    }

    fn ensure_synchronized(&self) -> Result<()> {
        if self.desynchronized {
            return Err(PreflightError::Protocol(
                "RPC stream desynchronized by an earlier failed read".to_string(),
            ));
        }
        Ok(())
    }

    fn read_failure(
        &mut self,
        err: rmpv::decode::Error,
        consumed: usize,
        method: &str,
        timeout: Duration,
    ) -> PreflightError {
        use rmpv::decode::Error as DecodeError;

        let io_err = match err {
            DecodeError::InvalidMarkerRead(e) | DecodeError::InvalidDataRead(e) => e,
            other => {
                self.desynchronized = true;
                return PreflightError::Protocol(other.to_string());
            }
        };

        // Any byte of the frame already taken leaves the stream mid-message.
        if consumed > 0 {
            self.desynchronized = true;
        }

        match io_err.kind() {
            ErrorKind::WouldBlock | ErrorKind::TimedOut => timeout_error(method, timeout),
            _ => {
                self.desynchronized = true;
                PreflightError::Connection(io_err)
            }
        }
    }
}

fn resolve(addr: &str) -> Result<SocketAddr> {
    addr.to_socket_addrs()
        .map_err(|e| PreflightError::Config(format!("Invalid address {}: {}", addr, e)))?
        .next()
        .ok_or_else(|| PreflightError::Config(format!("Address {} did not resolve", addr)))
}

fn timeout_error(method: &str, timeout: Duration) -> PreflightError {
    PreflightError::Timeout {
        operation: method.to_string(),
        timeout_ms: timeout.as_millis() as u64,
    }
}

fn parse_response(message: Value) -> Result<(u32, Value, Value)> {
    let mut parts = match message {
        Value::Array(parts) if parts.len() == 4 => parts,
        other => {
            return Err(PreflightError::Protocol(format!(
                "Malformed rpc response: {}",
                other
            )))
        }
    };

    if parts[0].as_u64() != Some(RESPONSE as u64) {
        return Err(PreflightError::Protocol(format!(
            "Unexpected message type {}",
            parts[0]
        )));
    }

    let msg_id = parts[1]
        .as_u64()
        .and_then(|id| u32::try_from(id).ok())
        .ok_or_else(|| PreflightError::Protocol(format!("Invalid message id {}", parts[1])))?;

    let result = parts.pop().unwrap_or(Value::Nil);
    let error = parts.pop().unwrap_or(Value::Nil);
    Ok((msg_id, error, result))
}

fn describe_error(error: &Value) -> String {
    match error {
        Value::String(s) => s.as_str().unwrap_or("<non-utf8 error>").to_string(),
        // Server-side exceptions arrive as [code, message]
        Value::Array(items) => items
            .iter()
            .rev()
            .find_map(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

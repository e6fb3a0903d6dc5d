//! Stream Actor: Dedicated thread that owns one response body.
//!
//! The actor connects, then reads the body in fixed-size chunks and sends
//! each one to the app loop. It never interprets the bytes; decoding and
//! dispatch stay on the app loop thread.

use super::{NetworkEvent, RequestId, StreamMessage, Transport};
use crate::error::TransportError;
use crate::protocol::GenerateRequest;
use crossbeam_channel::Sender;
use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Reader thread for one request.
pub struct StreamActor {
    /// Request this actor serves.
    request: RequestId,
    /// Handle to the reader thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to stop forwarding chunks.
    shutdown: Arc<AtomicBool>,
}

impl StreamActor {
    /// Spawn a reader for `request`.
    ///
    /// # Arguments
    ///
    /// * `transport` - Opens the response body.
    /// * `id` - Tag attached to every forwarded message.
    /// * `request` - Body of the `POST`.
    /// * `sender` - Channel to the app loop.
    /// * `chunk_size` - Maximum bytes per forwarded chunk.
    pub fn spawn(
        transport: Arc<dyn Transport>,
        id: RequestId,
        request: GenerateRequest,
        sender: Sender<NetworkEvent>,
        chunk_size: usize,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name(format!("architect-stream-{}", id.0))
            .spawn(move || {
                Self::run(
                    transport.as_ref(),
                    id,
                    &request,
                    &sender,
                    &shutdown_clone,
                    chunk_size.max(1),
                );
            })
            .expect("Failed to spawn stream thread");

        Self {
            request: id,
            handle: Some(handle),
            shutdown,
        }
    }

    /// Request served by this actor.
    pub const fn request(&self) -> RequestId {
        self.request
    }

    /// Stop forwarding. The thread exits after its current read.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the reader thread to finish.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Connect and pump the body.
    fn run(
        transport: &dyn Transport,
        id: RequestId,
        request: &GenerateRequest,
        sender: &Sender<NetworkEvent>,
        shutdown: &AtomicBool,
        chunk_size: usize,
    ) {
        let send = |message: StreamMessage| {
            sender
                .send(NetworkEvent {
                    request: id,
                    message,
                })
                .is_ok()
        };

        let mut body = match transport.open(request) {
            Ok(body) => body,
            Err(err) => {
                warn!(request = %id, error = %err, "failed to open generation stream");
                send(StreamMessage::Failed(err));
                return;
            }
        };

        let mut buf = vec![0u8; chunk_size];
        loop {
            if shutdown.load(Ordering::Relaxed) {
                debug!(request = %id, "stream actor stopped");
                return;
            }

            match body.read(&mut buf) {
                Ok(0) => {
                    debug!(request = %id, "generation stream ended");
                    send(StreamMessage::End);
                    return;
                }
                Ok(n) => {
                    if !send(StreamMessage::Chunk(buf[..n].to_vec())) {
                        // Receiver dropped, exit
                        return;
                    }
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => {
                    warn!(request = %id, error = %err, "generation stream read failed");
                    send(StreamMessage::Failed(TransportError::Read(err)));
                    return;
                }
            }
        }
    }
}

impl Drop for StreamActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::transport::Body;
    use crossbeam_channel::unbounded;
    use std::io;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Transport that serves scripted bodies without a network.
    pub(crate) struct ScriptedTransport {
        bodies: Mutex<Vec<Result<ScriptedBody, TransportError>>>,
        pub(crate) requests: Mutex<Vec<GenerateRequest>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(bodies: Vec<Result<ScriptedBody, TransportError>>) -> Self {
            Self {
                bodies: Mutex::new(bodies),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn open(&self, request: &GenerateRequest) -> Result<Body, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            let next = self.bodies.lock().unwrap().remove(0);
            next.map(|body| Box::new(body) as Body)
        }
    }

    /// Body that returns its chunks one read at a time, then optionally fails.
    pub(crate) struct ScriptedBody {
        chunks: Vec<Vec<u8>>,
        fail_at_end: bool,
    }

    impl ScriptedBody {
        pub(crate) fn new(chunks: &[&str]) -> Self {
            Self {
                chunks: chunks.iter().rev().map(|c| c.as_bytes().to_vec()).collect(),
                fail_at_end: false,
            }
        }

        pub(crate) fn failing(chunks: &[&str]) -> Self {
            Self {
                fail_at_end: true,
                ..Self::new(chunks)
            }
        }
    }

    impl Read for ScriptedBody {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.chunks.pop() {
                Some(mut chunk) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    if n < chunk.len() {
                        self.chunks.push(chunk.split_off(n));
                    }
                    Ok(n)
                }
                None if self.fail_at_end => {
                    Err(io::Error::new(ErrorKind::ConnectionReset, "connection reset"))
                }
                None => Ok(0),
            }
        }
    }

    fn collect(actor: StreamActor, rx: &crossbeam_channel::Receiver<NetworkEvent>) -> Vec<StreamMessage> {
        let mut messages = Vec::new();
        while let Ok(event) = rx.recv_timeout(Duration::from_secs(2)) {
            assert_eq!(event.request, actor.request());
            let done = !matches!(event.message, StreamMessage::Chunk(_));
            messages.push(event.message);
            if done {
                break;
            }
        }
        actor.join();
        messages
    }

    #[test]
    fn test_forwards_chunks_then_end() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(ScriptedBody::new(&[
            "data: {\"ty",
            "pe\":\"done\"}\n",
        ]))]));
        let (tx, rx) = unbounded();

        let actor = StreamActor::spawn(transport, RequestId(7), GenerateRequest::new("q"), tx, 4);
        let messages = collect(actor, &rx);

        let bytes: Vec<u8> = messages
            .iter()
            .filter_map(|m| match m {
                StreamMessage::Chunk(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .flatten()
            .collect();
        assert_eq!(bytes, b"data: {\"type\":\"done\"}\n");
        assert!(messages.iter().all(|m| match m {
            StreamMessage::Chunk(bytes) => bytes.len() <= 4,
            _ => true,
        }));
        assert!(matches!(messages.last(), Some(StreamMessage::End)));
    }

    #[test]
    fn test_open_failure_is_reported() {
        let transport = Arc::new(ScriptedTransport::new(vec![Err(TransportError::Status(502))]));
        let (tx, rx) = unbounded();

        let actor = StreamActor::spawn(transport, RequestId(1), GenerateRequest::new("q"), tx, 64);
        let messages = collect(actor, &rx);

        assert!(matches!(
            messages.as_slice(),
            [StreamMessage::Failed(TransportError::Status(502))]
        ));
    }

    #[test]
    fn test_read_failure_is_reported() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(ScriptedBody::failing(&["data: "]))]));
        let (tx, rx) = unbounded();

        let actor = StreamActor::spawn(transport, RequestId(2), GenerateRequest::new("q"), tx, 64);
        let messages = collect(actor, &rx);

        assert!(matches!(
            messages.as_slice(),
            [StreamMessage::Chunk(_), StreamMessage::Failed(TransportError::Read(_))]
        ));
    }
}

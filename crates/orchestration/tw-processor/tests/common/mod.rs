//! Test doubles shared by the processor scenario tests.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::{sleep, Duration};
use tw_error::{ProcessorError, TransportError, TransportResult};
use tw_processor::{BatchHandler, ErrorHandler};
use tw_traits::ConsumerClient;
use tw_types::{Message, ReceiveParams};

/// In-memory broker double: serves a scripted message list in order, records
/// every receive and ack call, and can inject failures.
pub struct MockClient {
    state: Mutex<MockState>,
    receive_delay: Duration,
}

struct MockState {
    messages: Vec<Message>,
    next: usize,
    receive_count: usize,
    receive_batch_sizes: Vec<usize>,
    fail_receives: usize,
    fail_ack: bool,
    acked: BTreeSet<String>,
    ack_calls: Vec<Vec<String>>,
}

impl MockClient {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            state: Mutex::new(MockState {
                messages,
                next: 0,
                receive_count: 0,
                receive_batch_sizes: Vec::new(),
                fail_receives: 0,
                fail_ack: false,
                acked: BTreeSet::new(),
                ack_calls: Vec::new(),
            }),
            // A receive is never instantaneous against a real broker; the
            // delay also keeps drained polling loops yielding to the test
            // runtime.
            receive_delay: Duration::from_millis(1),
        }
    }

    /// Fail the first `n` receive calls with a transport error.
    pub fn with_failing_receives(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_receives = n;
        self
    }

    /// Fail every ack call with a transport error.
    pub fn with_failing_acks(self) -> Self {
        self.state.lock().unwrap().fail_ack = true;
        self
    }

    /// Ack ids acknowledged so far, sorted.
    pub fn acknowledged(&self) -> Vec<String> {
        self.state.lock().unwrap().acked.iter().cloned().collect()
    }

    /// Every ack call, in order, with its id list.
    pub fn ack_calls(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().ack_calls.clone()
    }

    pub fn receive_count(&self) -> usize {
        self.state.lock().unwrap().receive_count
    }

    pub fn receive_batch_sizes(&self) -> Vec<usize> {
        self.state.lock().unwrap().receive_batch_sizes.clone()
    }
}

#[async_trait]
impl ConsumerClient for MockClient {
    async fn receive(&self, _: &str, params: &ReceiveParams) -> TransportResult<Vec<Message>> {
        sleep(self.receive_delay).await;

        let mut state = self.state.lock().unwrap();
        state.receive_count += 1;
        state.receive_batch_sizes.push(params.batch_size);

        if state.fail_receives > 0 {
            state.fail_receives -= 1;
            return Err(TransportError::Request("connection reset".to_string()));
        }

        let end = (state.next + params.batch_size).min(state.messages.len());
        let batch = state.messages[state.next..end].to_vec();
        state.next = end;
        Ok(batch)
    }

    async fn ack(&self, _: &str, ack_ids: &[String]) -> TransportResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_ack {
            return Err(TransportError::Status(503));
        }
        state.ack_calls.push(ack_ids.to_vec());
        for id in ack_ids {
            state.acked.insert(id.clone());
        }
        Ok(())
    }

    async fn nack(&self, _: &str, _: &[String]) -> TransportResult<()> {
        Ok(())
    }
}

/// Handler double: records batches, optionally sleeps or fails, and gauges
/// how many invocations overlap.
#[derive(Default)]
pub struct RecordingHandler {
    processed: Mutex<Vec<Vec<Message>>>,
    delay: Option<Duration>,
    fail_with: Option<String>,
    running: AtomicUsize,
    max_running: AtomicUsize,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing_with(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(message.into());
        self
    }

    pub fn processed_batches(&self) -> Vec<Vec<Message>> {
        self.processed.lock().unwrap().clone()
    }

    pub fn total_processed(&self) -> usize {
        self.processed.lock().unwrap().iter().map(Vec::len).sum()
    }

    /// Highest number of concurrently running invocations observed.
    pub fn max_parallel(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BatchHandler for RecordingHandler {
    async fn handle(&self, batch: &[Message]) -> anyhow::Result<()> {
        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            sleep(delay).await;
        }

        let result = match &self.fail_with {
            Some(message) => Err(anyhow::anyhow!("{message}")),
            None => {
                self.processed.lock().unwrap().push(batch.to_vec());
                Ok(())
            }
        };

        self.running.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Error sink double: records each report as (batch length, rendered error).
#[derive(Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<(Option<usize>, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Option<usize>, String)> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ErrorHandler for RecordingSink {
    async fn on_error(&self, batch: Option<&[Message]>, error: &ProcessorError) {
        self.entries
            .lock()
            .unwrap()
            .push((batch.map(<[Message]>::len), error.to_string()));
    }
}

/// Creates `n` scripted messages `msg-0..msg-n` with JSON payloads.
pub fn generate_test_messages(n: usize) -> Vec<Message> {
    (0..n)
        .map(|i| Message::new(format!("msg-{i}"), format!(r#"{{"value": {i}}}"#)))
        .collect()
}

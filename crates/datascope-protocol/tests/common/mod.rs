//! Scripted gateway and channel fakes for exercising the run orchestrator
//! without any real transport.

use async_trait::async_trait;
use datascope_protocol::{
    QueryError, QueryGateway, QuerySubmission, Result, ResultChannel, StartOutcome,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted step of a result channel.
#[derive(Debug, Clone)]
pub enum ChannelStep {
    /// Deliver a raw frame
    Frame(&'static str),
    /// Remote side closes the channel
    Disconnect,
    /// Transport failure mid-stream
    Fault(&'static str),
    /// Never deliver anything again (for deadline tests)
    Hang,
}

/// Counters observed by tests: how often the gateway was exercised.
#[derive(Debug, Default)]
pub struct GatewayProbe {
    pub submitted: AtomicUsize,
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
}

impl GatewayProbe {
    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

pub struct ScriptedChannel {
    steps: VecDeque<ChannelStep>,
    probe: Arc<GatewayProbe>,
}

#[async_trait]
impl ResultChannel for ScriptedChannel {
    async fn recv(&mut self) -> Result<Option<String>> {
        match self.steps.pop_front() {
            Some(ChannelStep::Frame(frame)) => Ok(Some(frame.to_string())),
            Some(ChannelStep::Disconnect) | None => Ok(None),
            Some(ChannelStep::Fault(message)) => {
                Err(QueryError::ChannelFailed(message.to_string()))
            }
            Some(ChannelStep::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
        }
    }

    async fn close(&mut self) {
        self.probe.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Gateway whose submission answer and channel script are fixed up front.
pub struct ScriptedGateway {
    outcome: Option<StartOutcome>,
    steps: Mutex<Option<VecDeque<ChannelStep>>>,
    pub probe: Arc<GatewayProbe>,
}

impl ScriptedGateway {
    pub fn with_outcome(outcome: StartOutcome) -> Self {
        Self {
            outcome: Some(outcome),
            steps: Mutex::new(None),
            probe: Arc::new(GatewayProbe::default()),
        }
    }

    /// Grants the submission and scripts the result channel.
    pub fn ready(session_id: &str, steps: Vec<ChannelStep>) -> Self {
        Self {
            outcome: Some(StartOutcome::Ready {
                session_id: session_id.to_string(),
            }),
            steps: Mutex::new(Some(steps.into())),
            probe: Arc::new(GatewayProbe::default()),
        }
    }

    /// Fails the submission exchange itself.
    pub fn submit_fault() -> Self {
        Self {
            outcome: None,
            steps: Mutex::new(None),
            probe: Arc::new(GatewayProbe::default()),
        }
    }
}

#[async_trait]
impl QueryGateway for ScriptedGateway {
    async fn submit(&self, _submission: &QuerySubmission) -> Result<StartOutcome> {
        self.probe.submitted.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Some(outcome) => Ok(outcome.clone()),
            None => Err(QueryError::SubmissionFailed("connection refused".to_string())),
        }
    }

    async fn open_stream(
        &self,
        _connection_id: &str,
        _session_id: &str,
    ) -> Result<Box<dyn ResultChannel>> {
        self.probe.opened.fetch_add(1, Ordering::SeqCst);
        let steps = self
            .steps
            .lock()
            .unwrap()
            .take()
            .expect("result channel opened more than once");
        Ok(Box::new(ScriptedChannel {
            steps,
            probe: self.probe.clone(),
        }))
    }
}

//! Decision providers and the bridge that runs them off the tick loop
//!
//! The tick never awaits a provider. A request is spawned on a tokio
//! runtime handle and its reply is sent back over an unbounded channel,
//! which the tick drains at the start of every step.

use crate::core::error::{Result, SimError};
use crate::core::types::AgentId;
use crate::llm::client::LlmClient;
use crate::llm::context::SituationContext;
use crate::llm::parser::{parse_decision, ProviderDecision};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub type DecisionFuture = Pin<Box<dyn Future<Output = Result<ProviderDecision>> + Send + 'static>>;

/// External source of decisions
pub trait DecisionProvider: Send + Sync {
    /// `situation` is the user-turn text, `persona` the system prompt
    fn request_decision(&self, situation: String, persona: String) -> DecisionFuture;
}

/// Provider backed by an LLM completion API
pub struct LlmDecisionProvider {
    client: LlmClient,
}

impl LlmDecisionProvider {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// Build from `LLM_API_KEY` and friends; fails when no key is configured
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(LlmClient::from_env()?))
    }
}

impl DecisionProvider for LlmDecisionProvider {
    fn request_decision(&self, situation: String, persona: String) -> DecisionFuture {
        let client = self.client.clone();
        Box::pin(async move {
            let response = client.complete(&persona, &situation).await?;
            parse_decision(&response)
        })
    }
}

/// A finished provider request
#[derive(Debug)]
pub struct DecisionReply {
    pub agent: AgentId,
    pub result: Result<ProviderDecision>,
}

pub struct DecisionBridge {
    provider: Arc<dyn DecisionProvider>,
    handle: Handle,
    timeout: Duration,
    tx: UnboundedSender<DecisionReply>,
    rx: UnboundedReceiver<DecisionReply>,
    in_flight: usize,
}

impl DecisionBridge {
    pub fn new(provider: Arc<dyn DecisionProvider>, handle: Handle, timeout_secs: f64) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            provider,
            handle,
            timeout: Duration::from_secs_f64(timeout_secs.max(0.001)),
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Spawn a request for `agent`. The caller owns the re-entrancy guard.
    pub fn request(&mut self, agent: AgentId, context: &SituationContext) {
        let tx = self.tx.clone();
        let provider = Arc::clone(&self.provider);
        let situation = context.summary();
        let persona = context.persona_prompt();
        let timeout = self.timeout;
        self.in_flight += 1;

        self.handle.spawn(async move {
            let result = match tokio::time::timeout(timeout, provider.request_decision(situation, persona)).await {
                Ok(result) => result,
                Err(_) => Err(SimError::LlmError(format!("request timed out after {:?}", timeout))),
            };
            // Receiver only disappears when the world is dropped
            let _ = tx.send(DecisionReply { agent, result });
        });
    }

    /// Replies that have arrived since the last drain
    pub fn drain(&mut self) -> Vec<DecisionReply> {
        let mut replies = Vec::new();
        while let Ok(reply) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            replies.push(reply);
        }
        replies
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

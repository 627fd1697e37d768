//! Generation request lifecycle
//!
//! The controller owns every piece of shared session state: the temperature,
//! the credential, both prompts, and the single outcome slot. The view layer
//! mutates it through explicit methods and only ever observes a
//! [`GenerationOutcome`].
//!
//! [`RequestController::invoke`] moves the slot to `Pending` and starts
//! exactly one client call on a tokio task. It hands back a
//! [`PendingGeneration`] that yields the [`Completion`], which the caller
//! feeds to [`RequestController::resolve`]. Nothing is cancelled; several
//! requests may be in flight at once and they all share the one slot.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ai::GenerationClient;
use crate::credential::Credential;
use crate::error::GenerationError;
use crate::prompts::PromptStore;
use crate::scenario::ScenarioId;
use crate::temperature::Temperature;

/// Which completion gets to fill the outcome slot when requests overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolvePolicy {
    /// Every completion is committed, so the slowest request wins.
    #[default]
    LastToFinish,
    /// Only the most recently started request may commit.
    LastStarted,
}

/// Everything captured when a request is dispatched
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub seq: u64,
    pub scenario: ScenarioId,
    pub prompt: String,
    pub temperature: Temperature,
    pub credential: Credential,
}

/// Result of one dispatched request, tagged with what produced it
#[derive(Debug, Clone)]
pub struct Completion {
    pub seq: u64,
    pub scenario: ScenarioId,
    pub temperature: Temperature,
    pub result: Result<String, GenerationError>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum GenerationOutcome {
    #[default]
    Idle,
    Pending {
        scenario: ScenarioId,
        temperature: Temperature,
    },
    Succeeded {
        scenario: ScenarioId,
        temperature: Temperature,
        text: String,
        completed_at: DateTime<Local>,
    },
    Failed {
        scenario: ScenarioId,
        temperature: Temperature,
        message: String,
    },
}

impl GenerationOutcome {
    pub fn scenario(&self) -> Option<ScenarioId> {
        match self {
            GenerationOutcome::Idle => None,
            GenerationOutcome::Pending { scenario, .. }
            | GenerationOutcome::Succeeded { scenario, .. }
            | GenerationOutcome::Failed { scenario, .. } => Some(*scenario),
        }
    }

    /// Temperature that was in effect when the request was dispatched.
    pub fn temperature(&self) -> Option<Temperature> {
        match self {
            GenerationOutcome::Idle => None,
            GenerationOutcome::Pending { temperature, .. }
            | GenerationOutcome::Succeeded { temperature, .. }
            | GenerationOutcome::Failed { temperature, .. } => Some(*temperature),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, GenerationOutcome::Pending { .. })
    }

    /// Badge text shown next to a successful result.
    pub fn badge(&self) -> Option<String> {
        match self {
            GenerationOutcome::Succeeded { temperature, .. } => {
                Some(format!("Generated at Temp: {temperature}"))
            }
            _ => None,
        }
    }
}

/// A generation call already running on the tokio runtime. Resolves to a
/// [`Completion`] and never fails; a task that panics is reported as an
/// upstream failure.
pub struct PendingGeneration {
    seq: u64,
    scenario: ScenarioId,
    temperature: Temperature,
    handle: JoinHandle<Completion>,
}

impl PendingGeneration {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl Future for PendingGeneration {
    type Output = Completion;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let polled = Pin::new(&mut self.handle).poll(cx);
        match polled {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(completion)) => Poll::Ready(completion),
            Poll::Ready(Err(err)) => Poll::Ready(Completion {
                seq: self.seq,
                scenario: self.scenario,
                temperature: self.temperature,
                result: Err(GenerationError::upstream(format!(
                    "generation task failed: {err}"
                ))),
            }),
        }
    }
}

pub struct RequestController {
    client: Arc<dyn GenerationClient>,
    temperature: Temperature,
    credential: Credential,
    prompts: PromptStore,
    outcome: GenerationOutcome,
    policy: ResolvePolicy,
    next_seq: u64,
    latest_started: Option<u64>,
    /// Dispatched requests not yet resolved, by sequence number.
    active: BTreeMap<u64, ScenarioId>,
}

impl RequestController {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self {
            client,
            temperature: Temperature::default(),
            credential: Credential::default(),
            prompts: PromptStore::new(),
            outcome: GenerationOutcome::Idle,
            policy: ResolvePolicy::default(),
            next_seq: 1,
            latest_started: None,
            active: BTreeMap::new(),
        }
    }

    pub fn with_policy(mut self, policy: ResolvePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_temperature(mut self, temperature: Temperature) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    pub fn set_temperature(&mut self, temperature: Temperature) {
        self.temperature = temperature;
    }

    pub fn step_temperature_up(&mut self) {
        self.temperature = self.temperature.step_up();
    }

    pub fn step_temperature_down(&mut self) {
        self.temperature = self.temperature.step_down();
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = credential;
    }

    pub fn prompts(&self) -> &PromptStore {
        &self.prompts
    }

    pub fn prompts_mut(&mut self) -> &mut PromptStore {
        &mut self.prompts
    }

    pub fn outcome(&self) -> &GenerationOutcome {
        &self.outcome
    }

    /// Requests dispatched but not yet resolved.
    pub fn in_flight(&self) -> usize {
        self.active.len()
    }

    /// Whether any unresolved request was started for `scenario`.
    pub fn is_generating(&self, scenario: ScenarioId) -> bool {
        self.active.values().any(|id| *id == scenario)
    }

    /// Start a generation for `scenario` with the current prompt, temperature
    /// and credential. Those values are captured now; later edits do not
    /// affect this request.
    ///
    /// The client call is spawned immediately, so this must be called from
    /// inside a tokio runtime.
    pub fn invoke(&mut self, scenario: ScenarioId) -> PendingGeneration {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest_started = Some(seq);
        self.active.insert(seq, scenario);

        let request = GenerationRequest {
            seq,
            scenario,
            prompt: self.prompts.get(scenario).to_string(),
            temperature: self.temperature,
            credential: self.credential.clone(),
        };

        self.outcome = GenerationOutcome::Pending {
            scenario,
            temperature: request.temperature,
        };

        info!(
            seq,
            scenario = scenario.as_str(),
            temperature = %request.temperature,
            in_flight = self.active.len(),
            "dispatching generation"
        );

        let client = Arc::clone(&self.client);
        let temperature = request.temperature;
        let handle = tokio::spawn(async move {
            let result = client
                .generate(&request.prompt, request.temperature, &request.credential)
                .await;
            Completion {
                seq: request.seq,
                scenario: request.scenario,
                temperature: request.temperature,
                result,
            }
        });

        PendingGeneration {
            seq,
            scenario,
            temperature,
            handle,
        }
    }

    /// Commit a finished request to the outcome slot. Returns whether the
    /// slot changed.
    pub fn resolve(&mut self, completion: Completion) -> bool {
        self.active.remove(&completion.seq);

        if let Err(err) = &completion.result {
            warn!(
                seq = completion.seq,
                scenario = completion.scenario.as_str(),
                error = %err,
                "generation failed"
            );
        }

        if self.policy == ResolvePolicy::LastStarted
            && self.latest_started != Some(completion.seq)
        {
            debug!(
                seq = completion.seq,
                latest = ?self.latest_started,
                "discarding completion from a superseded request"
            );
            return false;
        }

        self.outcome = match completion.result {
            Ok(text) => {
                info!(
                    seq = completion.seq,
                    scenario = completion.scenario.as_str(),
                    chars = text.chars().count(),
                    "generation succeeded"
                );
                GenerationOutcome::Succeeded {
                    scenario: completion.scenario,
                    temperature: completion.temperature,
                    text,
                    completed_at: Local::now(),
                }
            }
            Err(err) => GenerationOutcome::Failed {
                scenario: completion.scenario,
                temperature: completion.temperature,
                message: err.user_message().to_string(),
            },
        };
        true
    }

    /// Dispatch and resolve in one step.
    pub async fn run(&mut self, scenario: ScenarioId) -> &GenerationOutcome {
        let completion = self.invoke(scenario).await;
        self.resolve(completion);
        &self.outcome
    }
}

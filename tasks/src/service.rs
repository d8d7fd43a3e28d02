//! Caller-facing service.
//!
//! [`AvsService`] owns the task manager and the operator registry and runs
//! every state-changing call as one transaction: the relevant locks are held
//! from the first check to the last write. Locks are always taken in the
//! order tasks, then registry.
//!
//! Response verification is CPU-bound, so it runs on tokio's blocking pool
//! with owned guards rather than on a runtime worker.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use trappist_crypto::{service_id, Ed25519Verifier, SignatureVerifier};
use trappist_quorum::StakeView;
use trappist_registry::{LedgerEvent, OperatorRegistry, RegistrationRequest, RegistryError, StakeLedger};
use trappist_types::{
    AvsEvent, BlockNumber, ChainView, EventSink, OperatorId, Salt, ServiceId, Signature, TaskIndex, Timestamp,
};
use trappist_utils::StatsCounter;

use crate::config::{AvsConfig, ConfigError};
use crate::error::TaskError;
use crate::manager::TaskManager;
use crate::response::AcceptedResponse;
use crate::task::{Task, TaskStatus};

pub const STAT_TASKS_CREATED: &str = "tasks_created";
pub const STAT_RESPONSES_ACCEPTED: &str = "responses_accepted";
pub const STAT_RESPONSES_REJECTED: &str = "responses_rejected";
pub const STAT_OPERATORS_REGISTERED: &str = "operators_registered";

/// The AVS as seen by task creators, aggregators and the staking ledger.
///
/// Operator weights are read live from the ledger when a response is
/// verified. A task created while an operator held 70 shares is judged
/// against whatever the ledger says at submission time, and the total
/// weight is recomputed over the operators registered at that moment.
pub struct AvsService {
    chain: Arc<dyn ChainView>,
    events: Arc<dyn EventSink>,
    tasks: Arc<Mutex<TaskManager>>,
    registry: Arc<RwLock<OperatorRegistry>>,
    stats: StatsCounter,
}

impl AvsService {
    /// Build a service from configuration, verifying with Ed25519.
    pub fn new(
        config: &AvsConfig,
        chain: Arc<dyn ChainView>,
        ledger: Arc<dyn StakeLedger>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let verifier: Arc<dyn SignatureVerifier> = Arc::new(Ed25519Verifier);
        let registry = OperatorRegistry::new(
            service_id(&config.service_name),
            config.build_quorum()?,
            ledger,
            verifier.clone(),
        );
        let manager = TaskManager::new(
            config.build_policy()?,
            verifier,
            events.clone(),
            config.manager_options(),
        );
        Ok(Self::from_parts(manager, registry, chain, events))
    }

    /// Assemble a service from pre-built state machines.
    pub fn from_parts(
        manager: TaskManager,
        registry: OperatorRegistry,
        chain: Arc<dyn ChainView>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            chain,
            events,
            tasks: Arc::new(Mutex::new(manager)),
            registry: Arc::new(RwLock::new(registry)),
            stats: StatsCounter::new(&[
                STAT_TASKS_CREATED,
                STAT_RESPONSES_ACCEPTED,
                STAT_RESPONSES_REJECTED,
                STAT_OPERATORS_REGISTERED,
            ]),
        }
    }

    /// Create a task at the current block and return its index.
    pub async fn create_task(&self, payload: impl Into<String>) -> Result<TaskIndex, TaskError> {
        let mut tasks = self.tasks.lock().await;
        let index = tasks.create_task(payload, self.chain.block_number())?;
        self.stats.increment(STAT_TASKS_CREATED);
        Ok(index)
    }

    /// Submit an aggregate response. See [`TaskManager::respond_to_task`].
    pub async fn respond_to_task(
        &self,
        index: TaskIndex,
        payload: &str,
        creation_block: BlockNumber,
        blob: &[u8],
    ) -> Result<AcceptedResponse, TaskError> {
        let mut tasks = Arc::clone(&self.tasks).lock_owned().await;
        let registry = Arc::clone(&self.registry).read_owned().await;
        let now = self.chain.block_number();
        let payload = payload.to_owned();
        let blob = blob.to_vec();

        let result = match tokio::task::spawn_blocking(move || {
            tasks.respond_to_task(index, &payload, creation_block, &blob, &registry, now)
        })
        .await
        {
            Ok(result) => result,
            Err(e) => match e.try_into_panic() {
                Ok(panic) => std::panic::resume_unwind(panic),
                Err(e) => {
                    warn!(%index, error = %e, "verification worker cancelled");
                    Err(TaskError::Cancelled)
                }
            },
        };
        match &result {
            Ok(_) => self.stats.increment(STAT_RESPONSES_ACCEPTED),
            Err(e) if e.is_policy_rejection() => self.stats.increment(STAT_RESPONSES_REJECTED),
            Err(_) => {}
        }
        result
    }

    /// Register `operator` from its signed attestation, checked against the
    /// current block timestamp.
    pub async fn register_operator(
        &self,
        operator: OperatorId,
        signature: Signature,
        salt: Salt,
        expiry: Timestamp,
    ) -> Result<(), RegistryError> {
        let request = RegistrationRequest {
            operator,
            signature,
            salt,
            expiry,
        };
        let mut registry = self.registry.write().await;
        registry.register_operator(&request, self.chain.timestamp())?;
        self.stats.increment(STAT_OPERATORS_REGISTERED);
        self.events.emit(&AvsEvent::OperatorRegistered { operator });
        Ok(())
    }

    pub async fn deregister_operator(&self, operator: &OperatorId) -> Result<(), RegistryError> {
        let mut registry = self.registry.write().await;
        registry.deregister_operator(operator, self.chain.timestamp())?;
        self.events.emit(&AvsEvent::OperatorDeregistered {
            operator: *operator,
        });
        Ok(())
    }

    /// Apply a status change pushed by the staking ledger.
    pub async fn handle_ledger_event(&self, event: &LedgerEvent) -> Option<OperatorId> {
        let mut registry = self.registry.write().await;
        let changed = registry.apply_ledger_event(event, self.chain.timestamp());
        if let Some(operator) = changed {
            info!(%operator, "ledger removed operator");
            self.events.emit(&AvsEvent::OperatorDeregistered { operator });
        }
        changed
    }

    pub async fn is_operator_registered(&self, operator: &OperatorId) -> bool {
        self.registry.read().await.is_registered(operator)
    }

    /// Current weight of `operator`; zero unless registered.
    pub async fn operator_weight(&self, operator: &OperatorId) -> u128 {
        self.registry.read().await.weight_of(operator)
    }

    pub async fn total_weight(&self) -> u128 {
        self.registry.read().await.total_weight()
    }

    /// Whether `signed_weight` would meet the threshold against the
    /// registered weight right now.
    pub async fn quorum_reached(&self, signed_weight: u128) -> bool {
        let tasks = self.tasks.lock().await;
        let registry = self.registry.read().await;
        tasks.policy().accepts(signed_weight, &*registry)
    }

    pub async fn registered_operators(&self) -> Vec<OperatorId> {
        self.registry
            .read()
            .await
            .registered_operators()
            .copied()
            .collect()
    }

    pub async fn service_id(&self) -> ServiceId {
        *self.registry.read().await.service()
    }

    pub async fn task(&self, index: TaskIndex) -> Option<Task> {
        self.tasks.lock().await.task(index).cloned()
    }

    pub async fn task_status(&self, index: TaskIndex) -> Option<TaskStatus> {
        self.tasks.lock().await.status(index)
    }

    pub async fn accepted_response(&self, index: TaskIndex) -> Option<AcceptedResponse> {
        self.tasks.lock().await.accepted_response(index).cloned()
    }

    pub async fn latest_index(&self) -> Option<TaskIndex> {
        self.tasks.lock().await.latest_index()
    }

    pub async fn open_tasks(&self) -> Vec<Task> {
        self.tasks.lock().await.open_tasks().cloned().collect()
    }

    pub fn stats(&self) -> HashMap<&'static str, u64> {
        self.stats.snapshot()
    }

    pub fn chain(&self) -> &Arc<dyn ChainView> {
        &self.chain
    }
}

//! In-process devnet: one AVS, a simulated chain, a task spammer and the
//! dev operators answering every task.

use anyhow::Context;
use rand::rngs::OsRng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use trappist_crypto::{Ed25519Verifier, SignatureVerifier};
use trappist_operator::{generate_random_name, random_salt, OperatorSigner, ResponseAggregator};
use trappist_registry::InMemoryStakeLedger;
use trappist_tasks::{AvsService, TaskStatus};
use trappist_types::{
    AvsEvent, BlockNumber, ChainView, EventBus, EventSink, OperatorId, Signature, TaskIndex,
};

use crate::chain::DevChain;
use crate::config::DevnetConfig;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Forwards every service event onto a tokio broadcast channel.
pub struct BroadcastSink {
    tx: broadcast::Sender<AvsEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AvsEvent> {
        self.tx.subscribe()
    }
}

impl EventSink for BroadcastSink {
    fn emit(&self, event: &AvsEvent) {
        // No subscribers is fine.
        let _ = self.tx.send(event.clone());
    }
}

/// A signature produced by a dev operator, on its way to the aggregator.
struct SignedTask {
    index: TaskIndex,
    payload: String,
    created_block: BlockNumber,
    operator: OperatorId,
    signature: Signature,
}

pub struct Devnet {
    config: DevnetConfig,
    chain: Arc<DevChain>,
    ledger: Arc<InMemoryStakeLedger>,
    sink: Arc<BroadcastSink>,
    service: Arc<AvsService>,
    signers: Vec<Arc<OperatorSigner>>,
}

impl Devnet {
    pub fn new(config: DevnetConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let chain = Arc::new(DevChain::new(config.block_time_secs));
        let ledger = Arc::new(InMemoryStakeLedger::new());
        let sink = Arc::new(BroadcastSink::new(EVENT_CHANNEL_CAPACITY));
        let mut bus = EventBus::new();
        let forward = sink.clone();
        bus.subscribe(move |event| forward.emit(event));
        bus.subscribe(|event| debug!(?event, "avs event"));
        let service = Arc::new(AvsService::new(
            &config.avs,
            chain.clone(),
            ledger.clone(),
            Arc::new(bus),
        )?);
        let signers = config
            .operators
            .iter()
            .map(|op| Arc::new(OperatorSigner::from_seed(&op.key_seed())))
            .collect();
        Ok(Self {
            config,
            chain,
            ledger,
            sink,
            service,
            signers,
        })
    }

    pub fn service(&self) -> &Arc<AvsService> {
        &self.service
    }

    /// Put every dev operator on the ledger and register it with the service.
    pub async fn register_operators(&self) -> anyhow::Result<()> {
        let service_id = self.service.service_id().await;
        for (signer, op) in self.signers.iter().zip(&self.config.operators) {
            self.ledger.add_operator(signer.id());
            for strategy in &self.config.avs.strategies {
                self.ledger
                    .set_shares(signer.id(), strategy.strategy.as_str(), u128::from(op.shares));
            }
            let expiry = self
                .chain
                .timestamp()
                .plus_secs(self.config.registration_ttl_secs);
            let req = signer.registration_request(&service_id, random_salt(&mut OsRng), expiry);
            self.service
                .register_operator(req.operator, req.signature, req.salt, req.expiry)
                .await
                .with_context(|| format!("registering dev operator {}", signer.id()))?;
        }
        let total_weight = self.service.total_weight().await;
        info!(
            operators = self.signers.len(),
            total_weight,
            "dev operators registered"
        );
        Ok(())
    }

    /// Run until `shutdown` flips to `true`.
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        self.register_operators().await?;

        let (sig_tx, sig_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let mut handles: Vec<JoinHandle<()>> = Vec::new();

        handles.push(tokio::spawn(mine_blocks(self.chain.clone(), shutdown.clone())));
        for signer in &self.signers {
            handles.push(tokio::spawn(operator_loop(
                signer.clone(),
                self.sink.subscribe(),
                sig_tx.clone(),
                shutdown.clone(),
            )));
        }
        drop(sig_tx);
        handles.push(tokio::spawn(aggregate_loop(
            self.service.clone(),
            self.config.pending_ttl_blocks,
            sig_rx,
        )));
        handles.push(tokio::spawn(spam_tasks(
            self.service.clone(),
            Duration::from_secs(self.config.task_interval_secs),
            shutdown,
        )));

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "devnet task panicked");
            }
        }
        info!(stats = ?self.service.stats(), "devnet stopped");
        Ok(())
    }
}

async fn mine_blocks(chain: Arc<DevChain>, mut shutdown: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(Duration::from_secs(chain.block_time_secs()));
    interval.tick().await;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let block = chain.mine();
                debug!(%block, "mined block");
            }
            _ = shutdown.changed() => break,
        }
    }
}

/// Create a randomly named task every `every`.
async fn spam_tasks(service: Arc<AvsService>, every: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(every);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let name = generate_random_name(&mut rand::thread_rng());
                match service.create_task(name.clone()).await {
                    Ok(index) => info!(%index, %name, "spammed task"),
                    Err(e) => warn!(error = %e, "task creation failed"),
                }
            }
            _ = shutdown.changed() => break,
        }
    }
}

/// One dev operator: sign every new task and hand the signature on.
async fn operator_loop(
    signer: Arc<OperatorSigner>,
    mut events: broadcast::Receiver<AvsEvent>,
    out: mpsc::Sender<SignedTask>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let event = tokio::select! {
            event = events.recv() => event,
            _ = shutdown.changed() => break,
        };
        match event {
            Ok(AvsEvent::TaskCreated {
                index,
                payload,
                block,
            }) => {
                let signature = signer.sign_task(index, &payload, block);
                let signed = SignedTask {
                    index,
                    payload,
                    created_block: block,
                    operator: signer.id(),
                    signature,
                };
                if out.send(signed).await.is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(operator = %signer.id(), missed, "operator fell behind on events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Feed dev operator signatures into a [`PendingResponses`] until every
/// operator loop has stopped.
async fn aggregate_loop(
    service: Arc<AvsService>,
    ttl_blocks: u64,
    mut signatures: mpsc::Receiver<SignedTask>,
) {
    let mut pending = PendingResponses::new(ttl_blocks);
    while let Some(signed) = signatures.recv().await {
        pending.accept(&service, signed).await;
    }
}

/// Partial signature sets per open task.
///
/// A task is submitted as soon as its signers' current weight meets the
/// threshold. Entries for tasks that were resolved elsewhere or are older
/// than `ttl_blocks` are dropped.
struct PendingResponses {
    verifier: Arc<dyn SignatureVerifier>,
    ttl_blocks: u64,
    pending: HashMap<TaskIndex, ResponseAggregator>,
}

impl PendingResponses {
    fn new(ttl_blocks: u64) -> Self {
        Self {
            verifier: Arc::new(Ed25519Verifier),
            ttl_blocks,
            pending: HashMap::new(),
        }
    }

    fn len(&self) -> usize {
        self.pending.len()
    }

    fn expired(&self, created_block: BlockNumber, now: BlockNumber) -> bool {
        now.get().saturating_sub(created_block.get()) > self.ttl_blocks
    }

    async fn accept(&mut self, service: &AvsService, signed: SignedTask) {
        self.evict(service).await;

        let index = signed.index;
        let now = service.chain().block_number();
        if self.expired(signed.created_block, now)
            || service.task_status(index).await != Some(TaskStatus::Created)
        {
            debug!(%index, operator = %signed.operator, "signature for a closed task dropped");
            return;
        }

        let verifier = &self.verifier;
        let aggregator = self.pending.entry(index).or_insert_with(|| {
            ResponseAggregator::new(index, signed.payload.clone(), signed.created_block, verifier.clone())
        });
        if let Err(e) = aggregator.add(signed.operator, signed.signature) {
            warn!(%index, error = %e, "aggregator refused signature");
            return;
        }
        let signers: Vec<OperatorId> = aggregator.operators().copied().collect();

        let mut signed_weight = 0u128;
        for operator in &signers {
            signed_weight = signed_weight.saturating_add(service.operator_weight(operator).await);
        }
        if !service.quorum_reached(signed_weight).await {
            debug!(%index, signers = signers.len(), signed_weight, "waiting for more signatures");
            return;
        }

        let Some(aggregator) = self.pending.remove(&index) else {
            return;
        };
        if !submit(service, &aggregator).await {
            self.pending.insert(index, aggregator);
        }
    }

    async fn evict(&mut self, service: &AvsService) {
        let now = service.chain().block_number();
        let indices: Vec<TaskIndex> = self.pending.keys().copied().collect();
        for index in indices {
            let expired = self
                .pending
                .get(&index)
                .is_some_and(|agg| self.expired(agg.created_block(), now));
            if expired || service.task_status(index).await != Some(TaskStatus::Created) {
                self.pending.remove(&index);
                debug!(%index, expired, remaining = self.len(), "pending response dropped");
            }
        }
    }
}

/// Build, encode and submit one response. Returns whether it was accepted.
async fn submit(service: &AvsService, aggregator: &ResponseAggregator) -> bool {
    let index = aggregator.index();
    let blob = match aggregator.build().map(|b| b.encode()) {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            warn!(%index, error = %e, "could not encode response");
            return false;
        }
        Err(e) => {
            warn!(%index, error = %e, "could not build response");
            return false;
        }
    };
    match service
        .respond_to_task(index, aggregator.payload(), aggregator.created_block(), &blob)
        .await
    {
        Ok(accepted) => {
            info!(
                %index,
                signed_weight = accepted.signed_weight,
                total_weight = accepted.total_weight,
                response_digest = %accepted.response_digest,
                "task answered"
            );
            true
        }
        Err(e) => {
            warn!(%index, error = %e, "response not accepted");
            false
        }
    }
}

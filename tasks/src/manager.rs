//! Task manager state machine.

use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use trappist_codec::{response_digest, ResponseBlob};
use trappist_crypto::{SignatureError, SignatureVerifier};
use trappist_quorum::{QuorumPolicy, StakeView};
use trappist_registry::OperatorRegistry;
use trappist_types::{AvsEvent, BlockNumber, Digest, EventSink, OperatorId, TaskIndex};

use crate::error::{ContractViolation, Rejection, StaleReason, TaskError};
use crate::response::AcceptedResponse;
use crate::task::{Task, TaskStatus};

/// Tunables that do not change acceptance semantics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ManagerOptions {
    /// Upper bound on signers per response blob.
    pub max_response_operators: usize,
    /// Longest payload, in bytes, a task may carry.
    pub max_payload_len: usize,
    /// Verify the signatures of one response on the rayon pool.
    pub parallel_verification: bool,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            max_response_operators: 256,
            max_payload_len: 64 * 1024,
            parallel_verification: true,
        }
    }
}

/// Owns the task table and every accepted response.
///
/// All mutation happens in [`create_task`](Self::create_task) and on the
/// accept path of [`respond_to_task`](Self::respond_to_task). A rejected
/// response leaves the table untouched, so the same task can be answered again.
pub struct TaskManager {
    policy: QuorumPolicy,
    verifier: Arc<dyn SignatureVerifier>,
    events: Arc<dyn EventSink>,
    options: ManagerOptions,
    /// Position `i` holds the task with index `i`.
    tasks: Vec<Task>,
    /// `None` once the last index has been handed out.
    next_index: Option<TaskIndex>,
    responses: HashMap<TaskIndex, AcceptedResponse>,
}

impl TaskManager {
    pub fn new(
        policy: QuorumPolicy,
        verifier: Arc<dyn SignatureVerifier>,
        events: Arc<dyn EventSink>,
        options: ManagerOptions,
    ) -> Self {
        Self {
            policy,
            verifier,
            events,
            options,
            tasks: Vec::new(),
            next_index: Some(TaskIndex::FIRST),
            responses: HashMap::new(),
        }
    }

    pub fn policy(&self) -> &QuorumPolicy {
        &self.policy
    }

    /// Record a new task at `block` under the next sequential index.
    ///
    /// Payloads longer than [`ManagerOptions::max_payload_len`] are refused,
    /// which keeps every length the digest encodes within `u32`.
    pub fn create_task(
        &mut self,
        payload: impl Into<String>,
        block: BlockNumber,
    ) -> Result<TaskIndex, TaskError> {
        let payload = payload.into();
        if payload.len() > self.options.max_payload_len {
            return Err(ContractViolation::PayloadTooLarge {
                len: payload.len(),
                max: self.options.max_payload_len,
            }
            .into());
        }
        let index = self.next_index.ok_or(ContractViolation::IndexSpaceExhausted)?;
        let task = Task {
            index,
            payload,
            created_block: block,
        };

        info!(%index, payload = %task.payload, %block, "task created");
        self.events.emit(&AvsEvent::TaskCreated {
            index,
            payload: task.payload.clone(),
            block,
        });
        self.tasks.push(task);
        self.next_index = index.next();
        Ok(index)
    }

    /// Verify an aggregate response and resolve the task if it is acceptable.
    ///
    /// `payload` and `creation_block` must restate the task as it was created.
    /// Weights are read from `registry` as it stands now, not as of task creation.
    ///
    /// The blob is decoded before any state is consulted, so an undecodable
    /// blob sent to an already resolved task reports
    /// [`ContractViolation::MalformedResponse`] rather than
    /// [`StaleReason::AlreadyResolved`].
    pub fn respond_to_task(
        &mut self,
        index: TaskIndex,
        payload: &str,
        creation_block: BlockNumber,
        blob: &[u8],
        registry: &OperatorRegistry,
        now: BlockNumber,
    ) -> Result<AcceptedResponse, TaskError> {
        let task = self
            .task(index)
            .ok_or(ContractViolation::UnknownTask(index))?;
        let blob = ResponseBlob::decode(blob, self.options.max_response_operators)?;

        match self.evaluate(task, payload, creation_block, &blob, registry, now) {
            Ok(accepted) => {
                info!(
                    %index,
                    signers = accepted.operators.len(),
                    signed_weight = accepted.signed_weight,
                    required_weight = accepted.required_weight,
                    "task resolved"
                );
                self.events.emit(&AvsEvent::TaskResponded {
                    index,
                    accepted: true,
                    reason: None,
                    response_digest: Some(accepted.response_digest),
                });
                self.responses.insert(index, accepted.clone());
                Ok(accepted)
            }
            Err(rejection) => {
                warn!(%index, reason = %rejection, "response rejected");
                self.events.emit(&AvsEvent::TaskResponded {
                    index,
                    accepted: false,
                    reason: Some(rejection.to_string()),
                    response_digest: None,
                });
                Err(rejection.into())
            }
        }
    }

    /// Steps 1-5 of response handling. Reads only.
    fn evaluate(
        &self,
        task: &Task,
        payload: &str,
        creation_block: BlockNumber,
        blob: &ResponseBlob,
        registry: &OperatorRegistry,
        now: BlockNumber,
    ) -> Result<AcceptedResponse, Rejection> {
        let index = task.index;
        let stale = |reason| Rejection::StaleOrMismatchedTask { index, reason };

        if self.responses.contains_key(&index) {
            return Err(stale(StaleReason::AlreadyResolved));
        }
        if task.payload != payload {
            return Err(stale(StaleReason::PayloadMismatch));
        }
        if task.created_block != creation_block {
            return Err(stale(StaleReason::CreationBlockMismatch {
                recorded: task.created_block,
                claimed: creation_block,
            }));
        }
        if blob.reference_block != task.created_block {
            return Err(stale(StaleReason::ReferenceBlockMismatch {
                recorded: task.created_block,
                reference: blob.reference_block,
            }));
        }

        let mut seen = HashSet::with_capacity(blob.len());
        if let Some(dup) = blob.operators.iter().find(|op| !seen.insert(**op)) {
            return Err(Rejection::DuplicateOperator(*dup));
        }

        let task_digest = task.digest();
        let verified = self.verify_all(&task_digest, blob)?;

        if let Some(op) = verified.iter().find(|op| !registry.is_registered(op)) {
            return Err(Rejection::UnregisteredOperator(*op));
        }

        let signed_weight = verified
            .iter()
            .fold(0u128, |acc, op| acc.saturating_add(registry.weight_of(op)));
        let tally = self.policy.tally(signed_weight, registry);
        if !tally.accepted {
            return Err(Rejection::InsufficientStake {
                signed: tally.signed_weight,
                required: tally.required_weight,
                total: tally.total_weight,
            });
        }

        Ok(AcceptedResponse {
            index,
            task_digest,
            response_digest: response_digest(&task_digest, blob.reference_block, &blob.operators),
            operators: blob.operators.clone(),
            signatures: blob.signatures.clone(),
            reference_block: blob.reference_block,
            signed_weight: tally.signed_weight,
            total_weight: tally.total_weight,
            required_weight: tally.required_weight,
            resolved_at: now,
        })
    }

    /// Check every signature; the first failure in submission order wins.
    fn verify_all(
        &self,
        digest: &Digest,
        blob: &ResponseBlob,
    ) -> Result<Vec<OperatorId>, Rejection> {
        let verifier = &self.verifier;
        let results: Vec<Result<OperatorId, SignatureError>> = if self.options.parallel_verification {
            blob.operators
                .par_iter()
                .zip(blob.signatures.par_iter())
                .map(|(op, sig)| verifier.verify(digest, op, sig))
                .collect()
        } else {
            blob.entries()
                .map(|(op, sig)| verifier.verify(digest, op, sig))
                .collect()
        };

        results
            .into_iter()
            .zip(&blob.operators)
            .map(|(result, op)| {
                result.map_err(|e| {
                    debug!(operator = %op, error = %e, "signature check failed");
                    Rejection::InvalidSignature(*op)
                })
            })
            .collect()
    }

    pub fn task(&self, index: TaskIndex) -> Option<&Task> {
        self.tasks.get(index.get() as usize)
    }

    pub fn status(&self, index: TaskIndex) -> Option<TaskStatus> {
        self.task(index).map(|_| {
            if self.responses.contains_key(&index) {
                TaskStatus::Resolved
            } else {
                TaskStatus::Created
            }
        })
    }

    pub fn accepted_response(&self, index: TaskIndex) -> Option<&AcceptedResponse> {
        self.responses.get(&index)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Index of the most recently created task.
    pub fn latest_index(&self) -> Option<TaskIndex> {
        self.tasks.last().map(|t| t.index)
    }

    /// Tasks still waiting for an accepted response, oldest first.
    pub fn open_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks
            .iter()
            .filter(|t| !self.responses.contains_key(&t.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trappist_crypto::{keypair_from_seed, sign_digest, Ed25519Verifier};
    use trappist_nullables::RecordingEventSink;
    use trappist_quorum::Quorum;
    use trappist_registry::{InMemoryStakeLedger, RegistrationRequest};
    use trappist_types::{KeyPair, Salt, ServiceId, Signature, Timestamp};

    const SERVICE: ServiceId = ServiceId([7; 32]);
    const CREATED_AT: BlockNumber = BlockNumber::GENESIS;

    struct Harness {
        manager: TaskManager,
        registry: OperatorRegistry,
        ledger: Arc<InMemoryStakeLedger>,
        events: Arc<RecordingEventSink>,
    }

    fn harness(options: ManagerOptions) -> Harness {
        let ledger = Arc::new(InMemoryStakeLedger::new());
        let events = Arc::new(RecordingEventSink::new());
        let registry = OperatorRegistry::new(
            SERVICE,
            Quorum::single(0, "steth"),
            ledger.clone(),
            Arc::new(Ed25519Verifier),
        );
        let manager = TaskManager::new(
            QuorumPolicy::new(6_600).unwrap(),
            Arc::new(Ed25519Verifier),
            events.clone(),
            options,
        );
        Harness {
            manager,
            registry,
            ledger,
            events,
        }
    }

    impl Harness {
        fn operator(&mut self, seed: u8, shares: u128, register: bool) -> KeyPair {
            let kp = keypair_from_seed(&[seed; 32]);
            self.ledger.add_operator(kp.public);
            self.ledger.set_shares(kp.public, "steth", shares);
            if register {
                let salt = Salt([seed; 32]);
                let expiry = Timestamp::new(u64::MAX);
                let digest =
                    trappist_codec::registration_digest(&SERVICE, &kp.public, &salt, expiry);
                self.registry
                    .register_operator(
                        &RegistrationRequest {
                            operator: kp.public,
                            signature: sign_digest(&digest, &kp.private),
                            salt,
                            expiry,
                        },
                        Timestamp::new(0),
                    )
                    .unwrap();
            }
            kp
        }

        fn respond(&mut self, index: TaskIndex, signers: &[&KeyPair]) -> Result<AcceptedResponse, TaskError> {
            let task = self.manager.task(index).unwrap().clone();
            let blob = signed_blob(&task, signers);
            self.manager.respond_to_task(
                index,
                &task.payload,
                task.created_block,
                &blob.encode().unwrap(),
                &self.registry,
                BlockNumber::new(5),
            )
        }
    }

    fn signed_blob(task: &Task, signers: &[&KeyPair]) -> ResponseBlob {
        let digest = task.digest();
        ResponseBlob {
            operators: signers.iter().map(|kp| kp.public).collect(),
            signatures: signers
                .iter()
                .map(|kp| sign_digest(&digest, &kp.private))
                .collect(),
            reference_block: task.created_block,
        }
    }

    #[test]
    fn indices_are_sequential_from_zero() {
        let mut h = harness(ManagerOptions::default());
        for expected in 0..5 {
            let index = h.manager.create_task("t", CREATED_AT).unwrap();
            assert_eq!(index, TaskIndex::new(expected));
        }
        assert_eq!(h.manager.task_count(), 5);
        assert_eq!(h.manager.latest_index(), Some(TaskIndex::new(4)));
    }

    #[test]
    fn exhausted_index_space_is_a_contract_violation() {
        let mut h = harness(ManagerOptions::default());
        h.manager.create_task("last", CREATED_AT).unwrap();
        h.manager.next_index = TaskIndex::new(u32::MAX).next();
        h.events.clear();

        let err = h.manager.create_task("one too many", CREATED_AT).unwrap_err();
        assert_eq!(err, TaskError::Contract(ContractViolation::IndexSpaceExhausted));
        assert_eq!(h.manager.task_count(), 1);
        assert!(h.events.is_empty());
    }

    #[test]
    fn oversized_payload_is_refused() {
        let mut h = harness(ManagerOptions {
            max_payload_len: 8,
            ..ManagerOptions::default()
        });
        h.manager.create_task("12345678", CREATED_AT).unwrap();
        let err = h.manager.create_task("123456789", CREATED_AT).unwrap_err();
        assert_eq!(
            err,
            TaskError::Contract(ContractViolation::PayloadTooLarge { len: 9, max: 8 })
        );
        assert!(!err.is_policy_rejection());
        assert_eq!(h.manager.task_count(), 1);
        assert_eq!(h.manager.latest_index(), Some(TaskIndex::new(0)));
    }

    #[test]
    fn create_emits_task_created() {
        let mut h = harness(ManagerOptions::default());
        h.manager.create_task("Steven", BlockNumber::new(3)).unwrap();
        assert_eq!(
            h.events.last(),
            Some(AvsEvent::TaskCreated {
                index: TaskIndex::new(0),
                payload: "Steven".into(),
                block: BlockNumber::new(3),
            })
        );
    }

    #[test]
    fn heavy_signer_alone_resolves() {
        let mut h = harness(ManagerOptions::default());
        let heavy = h.operator(1, 70, true);
        let _light = h.operator(2, 30, true);
        let index = h.manager.create_task("Steven", CREATED_AT).unwrap();

        let accepted = h.respond(index, &[&heavy]).unwrap();
        assert_eq!(accepted.signed_weight, 70);
        assert_eq!(accepted.total_weight, 100);
        assert_eq!(accepted.required_weight, 66);
        assert_eq!(accepted.resolved_at, BlockNumber::new(5));
        assert_eq!(h.manager.status(index), Some(TaskStatus::Resolved));
        assert!(h.manager.accepted_response(index).is_some());
        assert_eq!(h.manager.open_tasks().count(), 0);
    }

    #[test]
    fn light_signer_alone_is_insufficient() {
        let mut h = harness(ManagerOptions::default());
        let _heavy = h.operator(1, 70, true);
        let light = h.operator(2, 30, true);
        let index = h.manager.create_task("Steven", CREATED_AT).unwrap();

        let err = h.respond(index, &[&light]).unwrap_err();
        assert_eq!(
            err,
            TaskError::Rejected(Rejection::InsufficientStake {
                signed: 30,
                required: 66,
                total: 100
            })
        );
        assert!(err.is_policy_rejection());
        assert_eq!(h.manager.status(index), Some(TaskStatus::Created));
    }

    #[test]
    fn rejected_task_stays_open_for_retry() {
        let mut h = harness(ManagerOptions::default());
        let heavy = h.operator(1, 70, true);
        let light = h.operator(2, 30, true);
        let index = h.manager.create_task("Steven", CREATED_AT).unwrap();

        assert!(h.respond(index, &[&light]).is_err());
        assert!(h.respond(index, &[&heavy, &light]).is_ok());
    }

    #[test]
    fn second_submission_after_resolution_is_stale() {
        let mut h = harness(ManagerOptions::default());
        let heavy = h.operator(1, 70, true);
        let index = h.manager.create_task("Steven", CREATED_AT).unwrap();

        let first = h.respond(index, &[&heavy]).unwrap();
        let err = h.respond(index, &[&heavy]).unwrap_err();
        assert_eq!(
            err,
            TaskError::Rejected(Rejection::StaleOrMismatchedTask {
                index,
                reason: StaleReason::AlreadyResolved
            })
        );
        assert_eq!(h.manager.accepted_response(index), Some(&first));
    }

    #[test]
    fn duplicate_operator_rejected_even_if_signatures_valid() {
        let mut h = harness(ManagerOptions::default());
        let heavy = h.operator(1, 70, true);
        let index = h.manager.create_task("Steven", CREATED_AT).unwrap();

        let err = h.respond(index, &[&heavy, &heavy]).unwrap_err();
        assert_eq!(
            err,
            TaskError::Rejected(Rejection::DuplicateOperator(heavy.public))
        );
    }

    #[test]
    fn invalid_signature_aborts_whole_response() {
        let mut h = harness(ManagerOptions::default());
        let heavy = h.operator(1, 70, true);
        let light = h.operator(2, 30, true);
        let index = h.manager.create_task("Steven", CREATED_AT).unwrap();
        let task = h.manager.task(index).unwrap().clone();

        let mut blob = signed_blob(&task, &[&heavy, &light]);
        blob.signatures[1] = Signature([0u8; 64]);
        let err = h
            .manager
            .respond_to_task(index, "Steven", CREATED_AT, &blob.encode().unwrap(), &h.registry, CREATED_AT)
            .unwrap_err();
        assert_eq!(err, TaskError::Rejected(Rejection::InvalidSignature(light.public)));
        assert_eq!(h.manager.status(index), Some(TaskStatus::Created));
    }

    #[test]
    fn first_bad_signature_in_list_order_is_reported() {
        for parallel in [true, false] {
            let mut h = harness(ManagerOptions {
                parallel_verification: parallel,
                ..ManagerOptions::default()
            });
            let a = h.operator(1, 10, true);
            let b = h.operator(2, 10, true);
            let c = h.operator(3, 10, true);
            let index = h.manager.create_task("x", CREATED_AT).unwrap();
            let task = h.manager.task(index).unwrap().clone();

            let mut blob = signed_blob(&task, &[&a, &b, &c]);
            blob.signatures[1] = Signature([1u8; 64]);
            blob.signatures[2] = Signature([2u8; 64]);
            let err = h
                .manager
                .respond_to_task(index, "x", CREATED_AT, &blob.encode().unwrap(), &h.registry, CREATED_AT)
                .unwrap_err();
            assert_eq!(err, TaskError::Rejected(Rejection::InvalidSignature(b.public)));
        }
    }

    #[test]
    fn signature_for_another_task_is_invalid() {
        let mut h = harness(ManagerOptions::default());
        let heavy = h.operator(1, 70, true);
        let first = h.manager.create_task("A", CREATED_AT).unwrap();
        let second = h.manager.create_task("A", CREATED_AT).unwrap();
        let other = h.manager.task(first).unwrap().clone();

        let blob = signed_blob(&other, &[&heavy]);
        let err = h
            .manager
            .respond_to_task(second, "A", CREATED_AT, &blob.encode().unwrap(), &h.registry, CREATED_AT)
            .unwrap_err();
        assert_eq!(err, TaskError::Rejected(Rejection::InvalidSignature(heavy.public)));
    }

    #[test]
    fn unregistered_signer_rejected() {
        let mut h = harness(ManagerOptions::default());
        let heavy = h.operator(1, 70, true);
        let stranger = h.operator(2, 30, false);
        let index = h.manager.create_task("Steven", CREATED_AT).unwrap();

        let err = h.respond(index, &[&heavy, &stranger]).unwrap_err();
        assert_eq!(
            err,
            TaskError::Rejected(Rejection::UnregisteredOperator(stranger.public))
        );
    }

    #[test]
    fn mismatched_task_fields_are_stale() {
        let mut h = harness(ManagerOptions::default());
        let heavy = h.operator(1, 70, true);
        let index = h.manager.create_task("Steven", BlockNumber::new(2)).unwrap();
        let task = h.manager.task(index).unwrap().clone();
        let bytes = signed_blob(&task, &[&heavy]).encode().unwrap();

        let err = h
            .manager
            .respond_to_task(index, "Stephen", BlockNumber::new(2), &bytes, &h.registry, CREATED_AT)
            .unwrap_err();
        assert!(matches!(
            err.rejection(),
            Some(Rejection::StaleOrMismatchedTask {
                reason: StaleReason::PayloadMismatch,
                ..
            })
        ));

        let err = h
            .manager
            .respond_to_task(index, "Steven", BlockNumber::new(3), &bytes, &h.registry, CREATED_AT)
            .unwrap_err();
        assert!(matches!(
            err.rejection(),
            Some(Rejection::StaleOrMismatchedTask {
                reason: StaleReason::CreationBlockMismatch { .. },
                ..
            })
        ));
    }

    #[test]
    fn reference_block_must_match_creation_block() {
        let mut h = harness(ManagerOptions::default());
        let heavy = h.operator(1, 70, true);
        let index = h.manager.create_task("Steven", BlockNumber::new(2)).unwrap();
        let task = h.manager.task(index).unwrap().clone();
        let mut blob = signed_blob(&task, &[&heavy]);
        blob.reference_block = BlockNumber::new(9);

        let err = h
            .manager
            .respond_to_task(index, "Steven", BlockNumber::new(2), &blob.encode().unwrap(), &h.registry, CREATED_AT)
            .unwrap_err();
        assert_eq!(
            err,
            TaskError::Rejected(Rejection::StaleOrMismatchedTask {
                index,
                reason: StaleReason::ReferenceBlockMismatch {
                    recorded: BlockNumber::new(2),
                    reference: BlockNumber::new(9),
                }
            })
        );
    }

    #[test]
    fn unknown_task_is_a_contract_violation() {
        let mut h = harness(ManagerOptions::default());
        let err = h
            .manager
            .respond_to_task(TaskIndex::new(3), "x", CREATED_AT, &[], &h.registry, CREATED_AT)
            .unwrap_err();
        assert_eq!(
            err,
            TaskError::Contract(ContractViolation::UnknownTask(TaskIndex::new(3)))
        );
        assert!(!err.is_policy_rejection());
        assert!(h.events.is_empty());
    }

    #[test]
    fn malformed_blob_is_a_contract_violation() {
        let mut h = harness(ManagerOptions::default());
        let index = h.manager.create_task("x", CREATED_AT).unwrap();
        let err = h
            .manager
            .respond_to_task(index, "x", CREATED_AT, &[1, 2, 3], &h.registry, CREATED_AT)
            .unwrap_err();
        assert!(matches!(
            err,
            TaskError::Contract(ContractViolation::MalformedResponse(_))
        ));
    }

    #[test]
    fn malformed_blob_after_resolution_reports_decode_failure() {
        let mut h = harness(ManagerOptions::default());
        let heavy = h.operator(1, 70, true);
        let index = h.manager.create_task("x", CREATED_AT).unwrap();
        h.respond(index, &[&heavy]).unwrap();

        let err = h
            .manager
            .respond_to_task(index, "x", CREATED_AT, &[1, 2, 3], &h.registry, CREATED_AT)
            .unwrap_err();
        assert!(matches!(
            err,
            TaskError::Contract(ContractViolation::MalformedResponse(_))
        ));
        assert_eq!(h.manager.status(index), Some(TaskStatus::Resolved));
    }

    #[test]
    fn empty_response_is_insufficient() {
        let mut h = harness(ManagerOptions::default());
        let _heavy = h.operator(1, 70, true);
        let index = h.manager.create_task("x", CREATED_AT).unwrap();
        let err = h.respond(index, &[]).unwrap_err();
        assert!(matches!(
            err.rejection(),
            Some(Rejection::InsufficientStake { signed: 0, .. })
        ));
    }

    #[test]
    fn rejection_emits_event_but_changes_nothing() {
        let mut h = harness(ManagerOptions::default());
        let light = h.operator(2, 30, true);
        let _heavy = h.operator(1, 70, true);
        let index = h.manager.create_task("x", CREATED_AT).unwrap();
        h.events.clear();

        assert!(h.respond(index, &[&light]).is_err());
        match h.events.last() {
            Some(AvsEvent::TaskResponded {
                accepted: false,
                reason: Some(reason),
                response_digest: None,
                ..
            }) => assert!(reason.contains("insufficient stake")),
            other => panic!("unexpected event {other:?}"),
        }
        assert!(h.manager.accepted_response(index).is_none());
        assert_eq!(h.manager.open_tasks().count(), 1);
    }
}

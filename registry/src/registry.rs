//! Operator registration state.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};
use trappist_codec::registration_digest;
use trappist_crypto::SignatureVerifier;
use trappist_quorum::{Quorum, StakeView};
use trappist_types::{OperatorId, Salt, ServiceId, Signature, Timestamp};

use crate::ledger::{LedgerEvent, StakeLedger};
use crate::RegistryError;

/// Registration status. Entries are never deleted; deregistration flips the status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatorStatus {
    Registered,
    Deregistered,
}

/// What the registry remembers about an operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorRecord {
    pub operator: OperatorId,
    pub status: OperatorStatus,
    pub registered_at: Timestamp,
    pub deregistered_at: Option<Timestamp>,
}

/// A prospective operator's signed attestation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub operator: OperatorId,
    pub signature: Signature,
    pub salt: Salt,
    pub expiry: Timestamp,
}

/// Registered operators of one service and one quorum.
pub struct OperatorRegistry {
    service: ServiceId,
    quorum: Quorum,
    ledger: Arc<dyn StakeLedger>,
    verifier: Arc<dyn SignatureVerifier>,
    operators: BTreeMap<OperatorId, OperatorRecord>,
    consumed_salts: HashSet<(OperatorId, Salt)>,
}

impl OperatorRegistry {
    pub fn new(
        service: ServiceId,
        quorum: Quorum,
        ledger: Arc<dyn StakeLedger>,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> Self {
        Self {
            service,
            quorum,
            ledger,
            verifier,
            operators: BTreeMap::new(),
            consumed_salts: HashSet::new(),
        }
    }

    pub fn service(&self) -> &ServiceId {
        &self.service
    }

    pub fn quorum(&self) -> &Quorum {
        &self.quorum
    }

    /// Register an operator from a signed attestation.
    ///
    /// Checks run in a fixed order and nothing is written unless all pass:
    /// expiry, salt replay, signature, existing registration, ledger
    /// membership, quorum minimum stake. A successful call consumes the salt.
    pub fn register_operator(
        &mut self,
        request: &RegistrationRequest,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        let operator = request.operator;

        if request.expiry.is_before(now) {
            return Err(RegistryError::RegistrationExpired {
                operator,
                expiry: request.expiry,
                now,
            });
        }
        if self.consumed_salts.contains(&(operator, request.salt)) {
            return Err(RegistryError::RegistrationReplay {
                operator,
                salt: request.salt,
            });
        }

        let digest = registration_digest(&self.service, &operator, &request.salt, request.expiry);
        self.verifier
            .verify(&digest, &operator, &request.signature)
            .map_err(|e| {
                debug!(%operator, error = %e, "registration signature rejected");
                RegistryError::InvalidSignature(operator)
            })?;

        if self.is_registered(&operator) {
            return Err(RegistryError::AlreadyRegistered(operator));
        }
        if !self.ledger.is_operator(&operator) {
            return Err(RegistryError::NotLedgerOperator(operator));
        }
        let weight = self.ledger_weight(&operator);
        if weight < self.quorum.minimum_stake() {
            return Err(RegistryError::InsufficientOperatorStake {
                operator,
                weight,
                minimum: self.quorum.minimum_stake(),
            });
        }

        self.consumed_salts.insert((operator, request.salt));
        self.operators.insert(
            operator,
            OperatorRecord {
                operator,
                status: OperatorStatus::Registered,
                registered_at: now,
                deregistered_at: None,
            },
        );
        info!(%operator, weight, "operator registered");
        Ok(())
    }

    /// Flip a registered operator to `Deregistered`. The record is kept.
    pub fn deregister_operator(
        &mut self,
        operator: &OperatorId,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        match self.operators.get_mut(operator) {
            Some(record) if record.status == OperatorStatus::Registered => {
                record.status = OperatorStatus::Deregistered;
                record.deregistered_at = Some(now);
                info!(%operator, "operator deregistered");
                Ok(())
            }
            _ => Err(RegistryError::NotRegistered(*operator)),
        }
    }

    /// Apply a status change pushed by the staking ledger.
    ///
    /// Returns the operator that changed status, if any.
    pub fn apply_ledger_event(&mut self, event: &LedgerEvent, now: Timestamp) -> Option<OperatorId> {
        match event {
            LedgerEvent::OperatorExited { operator } => self
                .deregister_operator(operator, now)
                .ok()
                .map(|_| *operator),
        }
    }

    pub fn is_registered(&self, operator: &OperatorId) -> bool {
        self.operators
            .get(operator)
            .is_some_and(|r| r.status == OperatorStatus::Registered)
    }

    pub fn operator(&self, operator: &OperatorId) -> Option<&OperatorRecord> {
        self.operators.get(operator)
    }

    /// Currently registered operators, in identity order.
    pub fn registered_operators(&self) -> impl Iterator<Item = &OperatorId> {
        self.operators
            .values()
            .filter(|r| r.status == OperatorStatus::Registered)
            .map(|r| &r.operator)
    }

    pub fn registered_count(&self) -> usize {
        self.registered_operators().count()
    }

    fn ledger_weight(&self, operator: &OperatorId) -> u128 {
        self.quorum
            .weight(|strategy| self.ledger.shares(operator, strategy))
    }
}

impl StakeView for OperatorRegistry {
    fn weight_of(&self, operator: &OperatorId) -> u128 {
        if self.is_registered(operator) {
            self.ledger_weight(operator)
        } else {
            0
        }
    }

    fn total_weight(&self) -> u128 {
        self.registered_operators()
            .fold(0u128, |acc, op| acc.saturating_add(self.ledger_weight(op)))
    }
}

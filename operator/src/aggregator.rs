//! Collects operator signatures for one task and packs them into a response blob.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};
use trappist_codec::{task_digest, ResponseBlob};
use trappist_crypto::SignatureVerifier;
use trappist_types::{BlockNumber, Digest, OperatorId, Signature, TaskIndex};

use crate::AggregatorError;

/// Signature collection for a single task.
///
/// Each signature is checked on arrival so a bad operator cannot poison the
/// whole submission. A second signature from an operator already collected
/// is ignored. The blob lists operators in identity order, so two
/// aggregators holding the same signatures build identical blobs.
pub struct ResponseAggregator {
    index: TaskIndex,
    payload: String,
    created_block: BlockNumber,
    digest: Digest,
    verifier: Arc<dyn SignatureVerifier>,
    signatures: BTreeMap<OperatorId, Signature>,
}

impl ResponseAggregator {
    pub fn new(
        index: TaskIndex,
        payload: impl Into<String>,
        created_block: BlockNumber,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> Self {
        let payload = payload.into();
        let digest = task_digest(index, &payload, created_block);
        Self {
            index,
            payload,
            created_block,
            digest,
            verifier,
            signatures: BTreeMap::new(),
        }
    }

    pub fn index(&self) -> TaskIndex {
        self.index
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn created_block(&self) -> BlockNumber {
        self.created_block
    }

    /// Add one operator's signature.
    ///
    /// Returns `Ok(false)` if this operator already contributed.
    pub fn add(
        &mut self,
        operator: OperatorId,
        signature: Signature,
    ) -> Result<bool, AggregatorError> {
        if self.signatures.contains_key(&operator) {
            debug!(index = %self.index, %operator, "duplicate signature ignored");
            return Ok(false);
        }
        if let Err(e) = self.verifier.verify(&self.digest, &operator, &signature) {
            warn!(index = %self.index, %operator, error = %e, "dropping bad signature");
            return Err(AggregatorError::InvalidSignature(operator));
        }
        self.signatures.insert(operator, signature);
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    pub fn contains(&self, operator: &OperatorId) -> bool {
        self.signatures.contains_key(operator)
    }

    /// Operators collected so far, in identity order.
    pub fn operators(&self) -> impl Iterator<Item = &OperatorId> + '_ {
        self.signatures.keys()
    }

    /// The blob to submit with `respond_to_task`.
    pub fn build(&self) -> Result<ResponseBlob, AggregatorError> {
        if self.signatures.is_empty() {
            return Err(AggregatorError::Empty(self.index));
        }
        let (operators, signatures): (Vec<_>, Vec<_>) = self
            .signatures
            .iter()
            .map(|(op, sig)| (*op, *sig))
            .unzip();
        Ok(ResponseBlob {
            operators,
            signatures,
            reference_block: self.created_block,
        })
    }
}

//! The three messages of the protocol.

use trappist_types::{BlockNumber, Digest, OperatorId, Salt, ServiceId, TaskIndex, Timestamp};

use crate::DigestEncoder;

const TASK_DOMAIN: &str = "trappist/task/v1";
const RESPONSE_DOMAIN: &str = "trappist/response/v1";
const REGISTRATION_DOMAIN: &str = "trappist/registration/v1";

/// What each operator signs for a task: the task index, its payload and the
/// block it was created at.
pub fn task_digest(index: TaskIndex, payload: &str, creation_block: BlockNumber) -> Digest {
    let mut enc = DigestEncoder::new(TASK_DOMAIN);
    enc.put_u32(index.get())
        .put_str(payload)
        .put_u64(creation_block.get());
    enc.finish()
}

/// Identifies an aggregate response: the task digest, the block signing
/// happened at, and the signer set in submission order.
pub fn response_digest(
    task: &Digest,
    reference_block: BlockNumber,
    operators: &[OperatorId],
) -> Digest {
    let mut enc = DigestEncoder::new(RESPONSE_DOMAIN);
    enc.put_fixed(task.as_bytes())
        .put_u64(reference_block.get())
        .put_len(operators.len());
    for operator in operators {
        enc.put_fixed(operator.as_bytes());
    }
    enc.finish()
}

/// The attestation a prospective operator signs to register with `service`.
pub fn registration_digest(
    service: &ServiceId,
    operator: &OperatorId,
    salt: &Salt,
    expiry: Timestamp,
) -> Digest {
    let mut enc = DigestEncoder::new(REGISTRATION_DOMAIN);
    enc.put_fixed(service.as_bytes())
        .put_fixed(operator.as_bytes())
        .put_fixed(salt.as_bytes())
        .put_u64(expiry.as_secs());
    enc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_digest_is_deterministic() {
        let a = task_digest(TaskIndex::new(0), "Steven", BlockNumber::new(10));
        let b = task_digest(TaskIndex::new(0), "Steven", BlockNumber::new(10));
        assert_eq!(a, b);
    }

    #[test]
    fn task_digest_binds_every_field() {
        let base = task_digest(TaskIndex::new(0), "Steven", BlockNumber::new(10));
        assert_ne!(base, task_digest(TaskIndex::new(1), "Steven", BlockNumber::new(10)));
        assert_ne!(base, task_digest(TaskIndex::new(0), "Steve", BlockNumber::new(10)));
        assert_ne!(base, task_digest(TaskIndex::new(0), "Steven", BlockNumber::new(11)));
    }

    #[test]
    fn response_digest_depends_on_signer_order() {
        let task = task_digest(TaskIndex::new(0), "x", BlockNumber::new(1));
        let a = OperatorId::new([1; 32]);
        let b = OperatorId::new([2; 32]);
        assert_ne!(
            response_digest(&task, BlockNumber::new(1), &[a, b]),
            response_digest(&task, BlockNumber::new(1), &[b, a])
        );
    }

    #[test]
    fn registration_digest_binds_service() {
        let op = OperatorId::new([1; 32]);
        let salt = Salt([9; 32]);
        let expiry = Timestamp::new(100);
        assert_ne!(
            registration_digest(&ServiceId([1; 32]), &op, &salt, expiry),
            registration_digest(&ServiceId([2; 32]), &op, &salt, expiry)
        );
    }

    #[test]
    fn domains_never_collide() {
        // Same numeric content, different purpose.
        let task = task_digest(TaskIndex::new(0), "", BlockNumber::new(0));
        let response = response_digest(&Digest::ZERO, BlockNumber::new(0), &[]);
        assert_ne!(task, response);
    }
}

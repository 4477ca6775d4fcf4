// zkwarp/zkwarp-event-proof/src/event.rs
//
// Canonical event encoding, header signing digest, and the portable
// event-inclusion proof. Variable-length fields are length-prefixed so
// no two distinct events share a leaf encoding.

use serde::{Deserialize, Serialize};
use tiny_keccak::{Hasher, Keccak};

use zkwarp_common::ZkwarpError;

use crate::attestation::{Attestation, Attester};
use crate::merkle::{
    keccak256, merkle_prove, merkle_root, merkle_verify, Digest, EventMerkleProof, LEAF_TAG,
};

/// Wire format version for event proofs.
pub const EVENT_PROOF_VERSION: u32 = 1;

const HEADER_TAG: u8 = 0x02;
const EVENT_ID_TAG: u8 = 0x03;

/// An emitted log entry as recorded by the source subnet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    pub address: [u8; 20],
    pub topics: Vec<[u8; 32]>,
    pub data: Vec<u8>,
    /// Position of this event within its block; doubles as the leaf
    /// index in the block's event tree.
    pub log_index: u32,
}

/// Block header fields covered by the validator attestation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub source_domain: u32,
    pub height: u64,
    pub block_hash: [u8; 32],
    pub event_root: [u8; 32],
    pub timestamp: u64,
}

/// Self-contained proof that an event was included in an attested
/// block. Everything a remote verifier needs travels in this struct.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventProof {
    pub version: u32,
    pub event_id: [u8; 32],
    pub source_domain: u32,
    pub block_height: u64,
    pub block_hash: [u8; 32],
    pub event_root: [u8; 32],
    pub merkle_proof: EventMerkleProof,
    pub event: EventLog,
    pub attestation: Attestation,
    pub generated_at_unix: u64,
}

/// Per-check verdicts; `accepted` only when every check passed. The
/// split lets callers log which check failed without re-running them.
///
/// Height and domain are not checked independently: they are bound
/// through the attested header digest, so `attestation_valid` covers
/// them. `event_id_consistent` checks only the id derivation from
/// block hash and log index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventVerificationOutcome {
    pub version_supported: bool,
    pub event_id_consistent: bool,
    pub leaf_matches: bool,
    pub merkle_valid: bool,
    pub attestation_valid: bool,
}

impl EventVerificationOutcome {
    pub fn accepted(&self) -> bool {
        self.version_supported
            && self.event_id_consistent
            && self.leaf_matches
            && self.merkle_valid
            && self.attestation_valid
    }
}

/// Canonical leaf hash of an event. Tagged, with counts and lengths
/// fixed-width little-endian.
pub fn leaf_hash(event: &EventLog) -> Digest {
    let mut hasher = Keccak::v256();
    let mut out = [0u8; 32];
    hasher.update(&[LEAF_TAG]);
    hasher.update(&event.address);
    hasher.update(&(event.topics.len() as u32).to_le_bytes());
    for topic in &event.topics {
        hasher.update(topic);
    }
    hasher.update(&(event.data.len() as u64).to_le_bytes());
    hasher.update(&event.data);
    hasher.update(&event.log_index.to_le_bytes());
    hasher.finalize(&mut out);
    out
}

/// Digest the validator set signs over.
pub fn header_signing_digest(header: &BlockHeader) -> Digest {
    let mut hasher = Keccak::v256();
    let mut out = [0u8; 32];
    hasher.update(&[HEADER_TAG]);
    hasher.update(&header.source_domain.to_le_bytes());
    hasher.update(&header.height.to_le_bytes());
    hasher.update(&header.block_hash);
    hasher.update(&header.event_root);
    hasher.update(&header.timestamp.to_le_bytes());
    hasher.finalize(&mut out);
    out
}

/// Globally unique event identifier within a chain.
pub fn event_id(block_hash: &[u8; 32], log_index: u32) -> Digest {
    let mut bytes = Vec::with_capacity(37);
    bytes.push(EVENT_ID_TAG);
    bytes.extend_from_slice(block_hash);
    bytes.extend_from_slice(&log_index.to_le_bytes());
    keccak256(&bytes)
}

/// Build an inclusion proof for `events[index]` under `header`.
///
/// The header's event root must match the root recomputed from
/// `events`; a mismatch means the caller assembled the block wrong and
/// any proof would be unverifiable.
pub fn generate_event_proof(
    header: &BlockHeader,
    events: &[EventLog],
    index: usize,
    attester: &dyn Attester,
) -> Result<EventProof, ZkwarpError> {
    let leaves: Vec<Digest> = events.iter().map(leaf_hash).collect();
    let root = merkle_root(&leaves)?;
    if root != header.event_root {
        return Err(ZkwarpError::MalformedInput(
            "header event root does not match the supplied events".into(),
        ));
    }
    let merkle_proof = merkle_prove(&leaves, index)?;
    let event = events[index].clone();
    let attestation = attester.attest(&header_signing_digest(header));

    Ok(EventProof {
        version: EVENT_PROOF_VERSION,
        event_id: event_id(&header.block_hash, event.log_index),
        source_domain: header.source_domain,
        block_height: header.height,
        block_hash: header.block_hash,
        event_root: header.event_root,
        merkle_proof,
        event,
        attestation,
        generated_at_unix: header.timestamp,
    })
}

/// Check every component of an event proof. Never errors; each check
/// reports independently.
pub fn verify_event_proof(proof: &EventProof, attester: &dyn Attester) -> EventVerificationOutcome {
    let version_supported = proof.version == EVENT_PROOF_VERSION;

    let header = BlockHeader {
        source_domain: proof.source_domain,
        height: proof.block_height,
        block_hash: proof.block_hash,
        event_root: proof.event_root,
        timestamp: proof.generated_at_unix,
    };
    let event_id_consistent =
        proof.event_id == event_id(&proof.block_hash, proof.event.log_index);

    let leaf_matches = proof.merkle_proof.leaf_index == proof.event.log_index;
    let merkle_valid = merkle_verify(&proof.event_root, &leaf_hash(&proof.event), &proof.merkle_proof);
    let attestation_valid = attester.check(&header_signing_digest(&header), &proof.attestation);

    EventVerificationOutcome {
        version_supported,
        event_id_consistent,
        leaf_matches,
        merkle_valid,
        attestation_valid,
    }
}

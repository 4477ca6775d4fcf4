// zkwarp/zkwarp-event-proof/src/lib.rs
//
// Merkle event-inclusion proofs for cross-subnet verification: a prover
// on the source subnet packages an event, its sibling path, and a
// validator attestation over the block header; any holder of the
// validator commitment can check inclusion without chain access.

pub mod attestation;
pub mod chain;
pub mod event;
pub mod merkle;

pub use attestation::{Attestation, Attester, KeyedAttester};
pub use chain::{prove_event_from_tx, BlockInfo, ChainClient, Receipt, StaticChainClient};
pub use event::{
    generate_event_proof, header_signing_digest, leaf_hash, verify_event_proof, BlockHeader,
    EventLog, EventProof, EventVerificationOutcome, EVENT_PROOF_VERSION,
};
pub use merkle::{keccak256, merkle_prove, merkle_root, merkle_verify, Digest, EventMerkleProof};

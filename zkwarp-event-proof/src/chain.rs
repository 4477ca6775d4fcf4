// zkwarp/zkwarp-event-proof/src/chain.rs

use std::collections::HashMap;

use zkwarp_common::ZkwarpError;

use crate::attestation::Attester;
use crate::event::{generate_event_proof, BlockHeader, EventLog, EventProof};

/// Transaction receipt as far as proof generation cares: which block the
/// transaction landed in and which log indices it emitted.
#[derive(Clone, Debug)]
pub struct Receipt {
    pub tx_hash: [u8; 32],
    pub block_hash: [u8; 32],
    pub log_indices: Vec<u32>,
}

/// A block's header together with its full event list, in log order.
#[derive(Clone, Debug)]
pub struct BlockInfo {
    pub header: BlockHeader,
    pub events: Vec<EventLog>,
}

/// Read access to the source subnet. `Ok(None)` means the item is not
/// retrievable right now (not yet indexed, or pruned); `Err` means the
/// endpoint could not be reached. Proof generation treats both as
/// retryable.
pub trait ChainClient {
    fn fetch_receipt(&self, tx_hash: &[u8; 32]) -> Result<Option<Receipt>, ZkwarpError>;
    fn fetch_block(&self, block_hash: &[u8; 32]) -> Result<Option<BlockInfo>, ZkwarpError>;
}

/// Look up a transaction's event and build its inclusion proof.
pub fn prove_event_from_tx(
    client: &dyn ChainClient,
    attester: &dyn Attester,
    tx_hash: &[u8; 32],
    log_index: u32,
) -> Result<EventProof, ZkwarpError> {
    let receipt = client.fetch_receipt(tx_hash)?.ok_or_else(|| {
        // not-yet-indexed transactions land here; callers may retry
        ZkwarpError::ResourceUnavailable("transaction receipt not retrievable".into())
    })?;
    if !receipt.log_indices.contains(&log_index) {
        return Err(ZkwarpError::MalformedInput(format!(
            "transaction did not emit an event at log index {log_index}"
        )));
    }
    let block = client.fetch_block(&receipt.block_hash)?.ok_or_else(|| {
        ZkwarpError::ResourceUnavailable("block for receipt not retrievable".into())
    })?;

    generate_event_proof(&block.header, &block.events, log_index as usize, attester)
}

/// Fixed in-memory chain view for tests and replaying captured blocks.
#[derive(Default)]
pub struct StaticChainClient {
    receipts: HashMap<[u8; 32], Receipt>,
    blocks: HashMap<[u8; 32], BlockInfo>,
    unavailable: bool,
}

impl StaticChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block(mut self, block: BlockInfo) -> Self {
        self.blocks.insert(block.header.block_hash, block);
        self
    }

    pub fn with_receipt(mut self, receipt: Receipt) -> Self {
        self.receipts.insert(receipt.tx_hash, receipt);
        self
    }

    /// Make every fetch fail as if the chain endpoint were down.
    pub fn offline(mut self) -> Self {
        self.unavailable = true;
        self
    }

    fn check_online(&self) -> Result<(), ZkwarpError> {
        if self.unavailable {
            return Err(ZkwarpError::ResourceUnavailable(
                "chain endpoint unreachable".into(),
            ));
        }
        Ok(())
    }
}

impl ChainClient for StaticChainClient {
    fn fetch_receipt(&self, tx_hash: &[u8; 32]) -> Result<Option<Receipt>, ZkwarpError> {
        self.check_online()?;
        Ok(self.receipts.get(tx_hash).cloned())
    }

    fn fetch_block(&self, block_hash: &[u8; 32]) -> Result<Option<BlockInfo>, ZkwarpError> {
        self.check_online()?;
        Ok(self.blocks.get(block_hash).cloned())
    }
}

// zkwarp/zkwarp-circuit/src/gadgets/mod.rs

pub mod compare;
pub mod merkle;
pub mod nullifier;
pub mod poseidon;

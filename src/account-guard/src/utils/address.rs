use alloy_primitives::{keccak256, Address};

/// Deterministic account address = low 20 bytes of keccak256(deployer || nonce).
///
/// Used for the guard, the factory and every proxy, so no identity is ever handed out twice.
pub fn derive_address(deployer: Address, nonce: u64) -> Address {
    let mut buf = Vec::with_capacity(20 + 8);
    buf.extend_from_slice(deployer.as_slice());
    buf.extend_from_slice(&nonce.to_be_bytes());
    Address::from_slice(&keccak256(buf)[12..])
}

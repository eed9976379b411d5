//! Program Derived Address (PDA) derivation functions

use solana_program::{msg, pubkey::Pubkey};

use crate::error::VaultError;

/// PDA seed constants
pub mod seeds {
    pub const VAULT: &[u8] = b"vault";
}

/// Vault PDA, one per owner
pub struct VaultPDA;

impl VaultPDA {
    pub fn derive(program_id: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[seeds::VAULT, owner.as_ref()], program_id)
    }

    pub fn seeds(owner: &Pubkey) -> Vec<Vec<u8>> {
        vec![seeds::VAULT.to_vec(), owner.to_bytes().to_vec()]
    }

    /// Re-derive the owner's vault address and compare it with the supplied one.
    /// Returns the canonical bump on success.
    pub fn verify(program_id: &Pubkey, owner: &Pubkey, supplied: &Pubkey) -> Result<u8, VaultError> {
        let (expected, bump) = Self::derive(program_id, owner);
        if expected != *supplied {
            msg!("PDA mismatch. Expected: {}, Actual: {}", expected, supplied);
            return Err(VaultError::AddressMismatch);
        }
        Ok(bump)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_derivation_is_deterministic() {
        let program_id = crate::id();
        let owner = Pubkey::new_unique();

        let first = VaultPDA::derive(&program_id, &owner);
        let second = VaultPDA::derive(&program_id, &owner);
        assert_eq!(first, second);

        let seeds = VaultPDA::seeds(&owner);
        let seed_refs: Vec<&[u8]> = seeds.iter().map(|s| s.as_slice()).collect();
        let (from_seeds, _) = Pubkey::find_program_address(&seed_refs, &program_id);
        assert_eq!(from_seeds, first.0);
    }

    #[test]
    fn test_no_collisions_across_owners() {
        let program_id = crate::id();
        let mut addresses = HashSet::new();

        for _ in 0..256 {
            let owner = Pubkey::new_unique();
            let (address, _) = VaultPDA::derive(&program_id, &owner);
            assert!(addresses.insert(address));
        }
    }

    #[test]
    fn test_verify() {
        let program_id = crate::id();
        let owner = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        let (address, bump) = VaultPDA::derive(&program_id, &owner);

        assert_eq!(VaultPDA::verify(&program_id, &owner, &address), Ok(bump));
        assert_eq!(
            VaultPDA::verify(&program_id, &other, &address),
            Err(VaultError::AddressMismatch)
        );
    }
}

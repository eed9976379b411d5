use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    program_error::ProgramError,
    pubkey::Pubkey,
};

/// Per-owner custody record, stored at the owner's vault PDA
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Vault {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Only identity allowed to deposit, withdraw or close
    pub owner: Pubkey,

    /// Custodied lamports, rent reserve excluded
    pub balance: u64,

    /// Withdrawals are rejected before this instant
    pub unlock_time: UnixTimestamp,

    /// Clock reading when the vault was created
    pub created_at: UnixTimestamp,

    /// Canonical PDA bump
    pub bump: u8,
}

impl Vault {
    pub const DISCRIMINATOR: [u8; 8] = [84, 76, 86, 65, 85, 76, 84, 0]; // "TLVAULT\0"

    pub const LEN: usize = 8 + // discriminator
        32 + // owner
        8 + // balance
        8 + // unlock_time
        8 + // created_at
        1; // bump

    pub fn new(owner: Pubkey, created_at: UnixTimestamp, unlock_time: UnixTimestamp, bump: u8) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            owner,
            balance: 0,
            unlock_time,
            created_at,
            bump,
        }
    }

    /// Decode a record from raw account data, rejecting foreign layouts
    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        if data.len() < Self::LEN {
            return Err(ProgramError::InvalidAccountData);
        }

        let vault = Self::try_from_slice(&data[..Self::LEN])
            .map_err(|_| ProgramError::InvalidAccountData)?;

        if vault.discriminator != Self::DISCRIMINATOR {
            return Err(ProgramError::InvalidAccountData);
        }

        Ok(vault)
    }

    pub fn pack(&self, dst: &mut [u8]) -> Result<(), ProgramError> {
        if dst.len() < Self::LEN {
            return Err(ProgramError::AccountDataTooSmall);
        }
        self.serialize(&mut &mut dst[..Self::LEN])
            .map_err(|_| ProgramError::InvalidAccountData)
    }

    /// `now == unlock_time` already counts as unlocked
    pub fn is_unlocked(&self, now: UnixTimestamp) -> bool {
        now >= self.unlock_time
    }

    pub fn seconds_until_unlock(&self, now: UnixTimestamp) -> u64 {
        self.unlock_time.saturating_sub(now).max(0) as u64
    }

    pub fn snapshot(&self) -> VaultSnapshot {
        VaultSnapshot {
            owner: self.owner,
            balance: self.balance,
            unlock_time: self.unlock_time,
        }
    }
}

/// What callers get back from every successful operation
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultSnapshot {
    pub owner: Pubkey,
    pub balance: u64,
    pub unlock_time: UnixTimestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack() {
        let owner = Pubkey::new_unique();
        let mut vault = Vault::new(owner, 1_000, 87_400, 254);
        vault.balance = 42;

        let mut data = vec![0u8; Vault::LEN];
        vault.pack(&mut data).unwrap();
        assert_eq!(borsh::BorshSerialize::try_to_vec(&vault).unwrap().len(), Vault::LEN);

        let decoded = Vault::unpack(&data).unwrap();
        assert_eq!(decoded, vault);
    }

    #[test]
    fn test_unpack_rejects_zeroed_data() {
        let data = vec![0u8; Vault::LEN];
        assert_eq!(Vault::unpack(&data), Err(ProgramError::InvalidAccountData));
        assert_eq!(Vault::unpack(&data[..10]), Err(ProgramError::InvalidAccountData));
    }

    #[test]
    fn test_unlock_helpers() {
        let vault = Vault::new(Pubkey::new_unique(), 0, 86_400, 255);

        assert!(!vault.is_unlocked(86_399));
        assert!(vault.is_unlocked(86_400));
        assert!(vault.is_unlocked(86_401));

        assert_eq!(vault.seconds_until_unlock(0), 86_400);
        assert_eq!(vault.seconds_until_unlock(86_000), 400);
        assert_eq!(vault.seconds_until_unlock(90_000), 0);
    }
}

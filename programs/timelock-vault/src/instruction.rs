use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::error::VaultError;

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum VaultInstruction {
    /// Create the caller's vault with a fixed lock duration
    /// Accounts:
    /// 0. `[signer, writable]` Owner (pays rent)
    /// 1. `[writable]` Vault PDA
    /// 2. `[]` System program
    CreateVault {
        lock_duration_days: u64,
    },

    /// Move lamports from the caller into the vault
    /// Accounts:
    /// 0. `[signer, writable]` Caller
    /// 1. `[]` Vault owner
    /// 2. `[writable]` Vault PDA
    /// 3. `[]` System program
    Deposit {
        amount: u64,
    },

    /// Release the whole balance back to the caller after unlock
    /// Accounts:
    /// 0. `[signer, writable]` Caller
    /// 1. `[]` Vault owner
    /// 2. `[writable]` Vault PDA
    Withdraw,

    /// Remove an empty vault and refund its rent reserve
    /// Accounts:
    /// 0. `[signer, writable]` Owner
    /// 1. `[writable]` Vault PDA
    CloseVault,
}

impl VaultInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (&variant, rest) = input.split_first()
            .ok_or(VaultError::InvalidInstruction)?;

        Ok(match variant {
            0 => {
                let payload = CreateVaultPayload::try_from_slice(rest)
                    .map_err(|_| VaultError::InvalidInstruction)?;
                Self::CreateVault { lock_duration_days: payload.lock_duration_days }
            }
            1 => {
                let payload = DepositPayload::try_from_slice(rest)
                    .map_err(|_| VaultError::InvalidInstruction)?;
                Self::Deposit { amount: payload.amount }
            }
            2 if rest.is_empty() => Self::Withdraw,
            3 if rest.is_empty() => Self::CloseVault,
            _ => return Err(VaultError::InvalidInstruction.into()),
        })
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(9);
        match self {
            Self::CreateVault { lock_duration_days } => {
                buf.push(0);
                buf.extend_from_slice(&lock_duration_days.to_le_bytes());
            }
            Self::Deposit { amount } => {
                buf.push(1);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::Withdraw => buf.push(2),
            Self::CloseVault => buf.push(3),
        }
        buf
    }
}

#[derive(BorshSerialize, BorshDeserialize)]
struct CreateVaultPayload {
    lock_duration_days: u64,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct DepositPayload {
    amount: u64,
}

// Helper functions to create instructions
pub fn create_vault(
    program_id: &Pubkey,
    owner: &Pubkey,
    vault: &Pubkey,
    lock_duration_days: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*owner, true),
            AccountMeta::new(*vault, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: VaultInstruction::CreateVault { lock_duration_days }.pack(),
    }
}

pub fn deposit(
    program_id: &Pubkey,
    caller: &Pubkey,
    owner: &Pubkey,
    vault: &Pubkey,
    amount: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*caller, true),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new(*vault, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: VaultInstruction::Deposit { amount }.pack(),
    }
}

pub fn withdraw(
    program_id: &Pubkey,
    caller: &Pubkey,
    owner: &Pubkey,
    vault: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*caller, true),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new(*vault, false),
        ],
        data: VaultInstruction::Withdraw.pack(),
    }
}

pub fn close_vault(
    program_id: &Pubkey,
    owner: &Pubkey,
    vault: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*owner, true),
            AccountMeta::new(*vault, false),
        ],
        data: VaultInstruction::CloseVault.pack(),
    }
}

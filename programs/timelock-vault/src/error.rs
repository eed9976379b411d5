use num_derive::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, FromPrimitive, PartialEq, Eq)]
pub enum VaultError {
    #[error("Vault already exists")]
    AlreadyExists = 0,

    #[error("Vault address does not match derivation")]
    AddressMismatch = 1,

    #[error("Lock duration must be 1-365 days")]
    InvalidDuration = 2,

    #[error("Vault not found")]
    NotFound = 3,

    #[error("Caller is not the vault owner")]
    Unauthorized = 4,

    #[error("Amount must be greater than zero")]
    InvalidAmount = 5,

    #[error("Arithmetic overflow")]
    Overflow = 6,

    #[error("Funds are still locked")]
    StillLocked = 7,

    #[error("Vault is empty")]
    NothingToWithdraw = 8,

    #[error("Vault still holds a balance")]
    VaultNotEmpty = 9,

    #[error("Invalid instruction")]
    InvalidInstruction = 10,

    #[error("Vault lamports do not cover the recorded balance")]
    BalanceMismatch = 11,
}

impl PrintProgramError for VaultError {
    fn print<E>(&self) {
        use solana_program::msg;
        msg!("VaultError: {}", self);
    }
}

impl From<VaultError> for ProgramError {
    fn from(e: VaultError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for VaultError {
    fn type_of() -> &'static str {
        "VaultError"
    }
}

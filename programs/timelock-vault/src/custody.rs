//! Vault custody state machine
//!
//! Every operation is a pure transition from the prior record (or its
//! absence) to either a new record plus the lamport movement that must
//! accompany it, or an error. Nothing here touches accounts: the processor
//! and the ledger executor validate through these functions first and only
//! then apply the result, so a rejected call never leaves partial writes.

use solana_program::{clock::UnixTimestamp, msg, pubkey::Pubkey};

use crate::{
    constants::{MAX_LOCK_DAYS, MIN_LOCK_DAYS, SECONDS_PER_DAY},
    error::VaultError,
    state::Vault,
};

/// Lamports that move alongside a record update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    None,
    /// Caller funds the vault
    IntoVault(u64),
    /// Vault pays the caller
    OutOfVault(u64),
}

/// Result of a successful transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub vault: Vault,
    pub movement: Movement,
}

pub fn unlock_time_for(now: UnixTimestamp, lock_duration_days: u64) -> Result<UnixTimestamp, VaultError> {
    let days = i64::try_from(lock_duration_days).map_err(|_| VaultError::Overflow)?;
    days.checked_mul(SECONDS_PER_DAY)
        .and_then(|lock| now.checked_add(lock))
        .ok_or(VaultError::Overflow)
}

/// Absent -> Active(locked)
pub fn create_vault(
    prior: Option<&Vault>,
    owner: &Pubkey,
    lock_duration_days: u64,
    now: UnixTimestamp,
    bump: u8,
) -> Result<Vault, VaultError> {
    if prior.is_some() {
        msg!("Vault for {} already exists", owner);
        return Err(VaultError::AlreadyExists);
    }

    if !(MIN_LOCK_DAYS..=MAX_LOCK_DAYS).contains(&lock_duration_days) {
        msg!("Lock duration out of range: {} days", lock_duration_days);
        return Err(VaultError::InvalidDuration);
    }

    let unlock_time = unlock_time_for(now, lock_duration_days)?;

    Ok(Vault::new(*owner, now, unlock_time, bump))
}

/// Adds `amount` to the balance; the unlock time is left untouched
pub fn deposit(prior: Option<&Vault>, caller: &Pubkey, amount: u64) -> Result<Transition, VaultError> {
    let vault = require_owned(prior, caller)?;

    if amount == 0 {
        msg!("Deposit amount must be positive");
        return Err(VaultError::InvalidAmount);
    }

    let balance = vault.balance.checked_add(amount).ok_or_else(|| {
        msg!("Deposit overflows balance: {} + {}", vault.balance, amount);
        VaultError::Overflow
    })?;

    let mut next = vault.clone();
    next.balance = balance;

    Ok(Transition {
        vault: next,
        movement: Movement::IntoVault(amount),
    })
}

/// Releases the whole balance once the lock has expired
pub fn withdraw(prior: Option<&Vault>, caller: &Pubkey, now: UnixTimestamp) -> Result<Transition, VaultError> {
    let vault = require_owned(prior, caller)?;

    if !vault.is_unlocked(now) {
        msg!(
            "Vault locked until {} (now {}, {}s remaining)",
            vault.unlock_time,
            now,
            vault.seconds_until_unlock(now)
        );
        return Err(VaultError::StillLocked);
    }

    if vault.balance == 0 {
        msg!("Nothing to withdraw");
        return Err(VaultError::NothingToWithdraw);
    }

    let amount = vault.balance;
    let mut next = vault.clone();
    next.balance = 0;

    Ok(Transition {
        vault: next,
        movement: Movement::OutOfVault(amount),
    })
}

/// Active with zero balance -> Absent
pub fn close_vault(prior: Option<&Vault>, caller: &Pubkey) -> Result<(), VaultError> {
    let vault = require_owned(prior, caller)?;

    if vault.balance != 0 {
        msg!("Cannot close vault holding {} lamports", vault.balance);
        return Err(VaultError::VaultNotEmpty);
    }

    Ok(())
}

fn require_owned<'a>(prior: Option<&'a Vault>, caller: &Pubkey) -> Result<&'a Vault, VaultError> {
    let vault = prior.ok_or_else(|| {
        msg!("No vault found");
        VaultError::NotFound
    })?;

    if vault.owner != *caller {
        msg!("Caller {} is not vault owner {}", caller, vault.owner);
        return Err(VaultError::Unauthorized);
    }

    Ok(vault)
}

//! Ledger-driven custody executor
//!
//! [`Ledger`] is the narrow account-mutation interface the custody state
//! machine needs from whatever persists accounts and moves lamports.
//! [`VaultCustody`] drives the transitions in [`crate::custody`] against any
//! ledger, which lets the full custody contract run without a validator.

pub mod memory;

use solana_program::{
    clock::UnixTimestamp,
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::{
    custody::{self, Movement, Transition},
    error::VaultError,
    pda::seeds,
    state::{Vault, VaultSnapshot},
};

pub use memory::InMemoryLedger;

/// Capabilities consumed from the account substrate
pub trait Ledger {
    /// Deterministic address for `(tag, owner)` plus its bump
    fn derive(&self, tag: &[u8], owner: &Pubkey) -> (Pubkey, u8);

    fn read(&self, address: &Pubkey) -> Result<Option<Vault>, ProgramError>;

    fn write(&mut self, address: &Pubkey, vault: &Vault) -> ProgramResult;

    fn remove(&mut self, address: &Pubkey) -> ProgramResult;

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> ProgramResult;

    /// Lamports currently held at `address`
    fn lamports(&self, address: &Pubkey) -> Result<u64, ProgramError>;

    /// Canonical clock; never taken from the caller
    fn now(&self) -> Result<UnixTimestamp, ProgramError>;

    fn verify_signer(&self, identity: &Pubkey) -> bool;
}

pub struct VaultCustody<L: Ledger> {
    ledger: L,
}

impl<L: Ledger> VaultCustody<L> {
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn into_inner(self) -> L {
        self.ledger
    }

    pub fn vault_address(&self, owner: &Pubkey) -> Pubkey {
        self.ledger.derive(seeds::VAULT, owner).0
    }

    /// Current snapshot of the owner's vault, if one exists
    pub fn vault(&self, owner: &Pubkey) -> Result<Option<VaultSnapshot>, ProgramError> {
        let address = self.vault_address(owner);
        Ok(self.ledger.read(&address)?.map(|vault| vault.snapshot()))
    }

    pub fn create_vault(
        &mut self,
        caller: &Pubkey,
        address: &Pubkey,
        lock_duration_days: u64,
    ) -> Result<VaultSnapshot, ProgramError> {
        self.authorize(caller)?;
        let bump = self.verify_address(caller, address)?;

        let prior = self.ledger.read(address)?;
        let now = self.ledger.now()?;
        let vault = custody::create_vault(prior.as_ref(), caller, lock_duration_days, now, bump)?;

        self.ledger.write(address, &vault)?;

        msg!("Vault created for {}: unlocks at {}", caller, vault.unlock_time);
        Ok(vault.snapshot())
    }

    pub fn deposit(
        &mut self,
        caller: &Pubkey,
        owner: &Pubkey,
        address: &Pubkey,
        amount: u64,
    ) -> Result<VaultSnapshot, ProgramError> {
        self.authorize(caller)?;
        self.verify_address(owner, address)?;

        let prior = self.ledger.read(address)?;
        let transition = custody::deposit(prior.as_ref(), caller, amount)?;

        let snapshot = self.commit(address, caller, transition)?;
        msg!("Deposited {} lamports, balance now {}", amount, snapshot.balance);
        Ok(snapshot)
    }

    pub fn withdraw(
        &mut self,
        caller: &Pubkey,
        owner: &Pubkey,
        address: &Pubkey,
    ) -> Result<VaultSnapshot, ProgramError> {
        self.authorize(caller)?;
        self.verify_address(owner, address)?;

        let prior = self.ledger.read(address)?;
        let now = self.ledger.now()?;
        let transition = custody::withdraw(prior.as_ref(), caller, now)?;
        let Movement::OutOfVault(released) = transition.movement else {
            return Err(ProgramError::InvalidAccountData);
        };

        let snapshot = self.commit(address, caller, transition)?;
        msg!("Withdrew {} lamports to {}", released, caller);
        Ok(snapshot)
    }

    /// Removes an empty vault so the owner may create a new one.
    /// Lamports left at the address are refunded to the owner.
    pub fn close_vault(&mut self, caller: &Pubkey, address: &Pubkey) -> ProgramResult {
        self.authorize(caller)?;
        self.verify_address(caller, address)?;

        let prior = self.ledger.read(address)?;
        custody::close_vault(prior.as_ref(), caller)?;

        let refund = self.ledger.lamports(address)?;
        if refund > 0 {
            self.ledger.transfer(address, caller, refund)?;
        }
        if let Err(err) = self.ledger.remove(address) {
            if refund > 0 {
                self.ledger.transfer(caller, address, refund)?;
            }
            return Err(err);
        }

        msg!("Vault closed for {}, refunded {} lamports", caller, refund);
        Ok(())
    }

    fn authorize(&self, caller: &Pubkey) -> ProgramResult {
        if !self.ledger.verify_signer(caller) {
            msg!("Account {} must be a signer", caller);
            return Err(ProgramError::MissingRequiredSignature);
        }
        Ok(())
    }

    fn verify_address(&self, owner: &Pubkey, supplied: &Pubkey) -> Result<u8, ProgramError> {
        let (expected, bump) = self.ledger.derive(seeds::VAULT, owner);
        if expected != *supplied {
            msg!("PDA mismatch. Expected: {}, Actual: {}", expected, supplied);
            return Err(VaultError::AddressMismatch.into());
        }
        Ok(bump)
    }

    /// Apply the lamport movement and the record update as one step.
    /// A failed write reverses the movement before the error is returned.
    fn commit(
        &mut self,
        address: &Pubkey,
        counterparty: &Pubkey,
        transition: Transition,
    ) -> Result<VaultSnapshot, ProgramError> {
        let Transition { vault, movement } = transition;

        match movement {
            Movement::IntoVault(amount) => self.ledger.transfer(counterparty, address, amount)?,
            Movement::OutOfVault(amount) => self.ledger.transfer(address, counterparty, amount)?,
            Movement::None => {}
        }

        if let Err(err) = self.ledger.write(address, &vault) {
            let reverted = match movement {
                Movement::IntoVault(amount) => self.ledger.transfer(address, counterparty, amount),
                Movement::OutOfVault(amount) => self.ledger.transfer(counterparty, address, amount),
                Movement::None => Ok(()),
            };
            if let Err(revert_err) = reverted {
                msg!("Failed to reverse movement after write error: {:?}", revert_err);
            }
            return Err(err);
        }

        Ok(vault.snapshot())
    }
}

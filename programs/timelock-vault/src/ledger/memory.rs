//! In-memory ledger with a settable clock

use std::collections::{HashMap, HashSet};

use solana_program::{
    clock::UnixTimestamp,
    entrypoint::ProgramResult,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::{error::VaultError, state::Vault};

use super::Ledger;

#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    program_id: Pubkey,
    now: UnixTimestamp,
    balances: HashMap<Pubkey, u64>,
    records: HashMap<Pubkey, Vault>,
    signers: HashSet<Pubkey>,
    fail_writes: bool,
}

impl InMemoryLedger {
    pub fn new(program_id: Pubkey, now: UnixTimestamp) -> Self {
        Self {
            program_id,
            now,
            balances: HashMap::new(),
            records: HashMap::new(),
            signers: HashSet::new(),
            fail_writes: false,
        }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn fund(&mut self, account: &Pubkey, lamports: u64) {
        *self.balances.entry(*account).or_insert(0) += lamports;
    }

    pub fn balance_of(&self, account: &Pubkey) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Mark `identity` as having signed the current request
    pub fn sign_as(&mut self, identity: &Pubkey) {
        self.signers.insert(*identity);
    }

    pub fn revoke_signer(&mut self, identity: &Pubkey) {
        self.signers.remove(identity);
    }

    pub fn set_time(&mut self, now: UnixTimestamp) {
        self.now = now;
    }

    pub fn advance(&mut self, seconds: i64) {
        self.now = self.now.saturating_add(seconds);
    }

    /// Make every subsequent `write` fail, to exercise rollback
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl Ledger for InMemoryLedger {
    fn derive(&self, tag: &[u8], owner: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[tag, owner.as_ref()], &self.program_id)
    }

    fn read(&self, address: &Pubkey) -> Result<Option<Vault>, ProgramError> {
        Ok(self.records.get(address).cloned())
    }

    fn write(&mut self, address: &Pubkey, vault: &Vault) -> ProgramResult {
        if self.fail_writes {
            return Err(ProgramError::AccountBorrowFailed);
        }
        self.records.insert(*address, vault.clone());
        Ok(())
    }

    fn remove(&mut self, address: &Pubkey) -> ProgramResult {
        self.records.remove(address);
        Ok(())
    }

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> ProgramResult {
        let debited = self
            .balance_of(from)
            .checked_sub(amount)
            .ok_or(ProgramError::InsufficientFunds)?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;

        self.balances.insert(*from, debited);
        self.balances.insert(*to, credited);
        Ok(())
    }

    fn lamports(&self, address: &Pubkey) -> Result<u64, ProgramError> {
        Ok(self.balance_of(address))
    }

    fn now(&self) -> Result<UnixTimestamp, ProgramError> {
        Ok(self.now)
    }

    fn verify_signer(&self, identity: &Pubkey) -> bool {
        self.signers.contains(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_moves_lamports() {
        let mut ledger = InMemoryLedger::new(crate::id(), 0);
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        ledger.fund(&a, 100);

        ledger.transfer(&a, &b, 40).unwrap();
        assert_eq!(ledger.balance_of(&a), 60);
        assert_eq!(ledger.balance_of(&b), 40);

        assert_eq!(ledger.transfer(&a, &b, 61), Err(ProgramError::InsufficientFunds));
        assert_eq!(ledger.balance_of(&a), 60);
        assert_eq!(ledger.balance_of(&b), 40);
    }

    #[test]
    fn test_transfer_overflow_leaves_balances() {
        let mut ledger = InMemoryLedger::new(crate::id(), 0);
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        ledger.fund(&a, 10);
        ledger.fund(&b, u64::MAX);

        assert_eq!(ledger.transfer(&a, &b, 1), Err(VaultError::Overflow.into()));
        assert_eq!(ledger.balance_of(&a), 10);
    }

    #[test]
    fn test_clock_and_signers() {
        let mut ledger = InMemoryLedger::new(crate::id(), 1_000);
        let key = Pubkey::new_unique();

        ledger.advance(500);
        assert_eq!(ledger.now().unwrap(), 1_500);

        assert!(!ledger.verify_signer(&key));
        ledger.sign_as(&key);
        assert!(ledger.verify_signer(&key));
        ledger.revoke_signer(&key);
        assert!(!ledger.verify_signer(&key));
    }
}

use solana_program::{
    account_info::{next_account_info, AccountInfo},
    clock::Clock,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
    system_program,
    sysvar::Sysvar,
};

use crate::{
    custody::{self, Movement, Transition},
    error::VaultError,
    instruction::VaultInstruction,
    pda::{seeds, VaultPDA},
    state::Vault,
};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = VaultInstruction::unpack(instruction_data)?;

        match instruction {
            VaultInstruction::CreateVault { lock_duration_days } => {
                msg!("Instruction: CreateVault");
                Self::process_create_vault(program_id, accounts, lock_duration_days)
            }
            VaultInstruction::Deposit { amount } => {
                msg!("Instruction: Deposit");
                Self::process_deposit(program_id, accounts, amount)
            }
            VaultInstruction::Withdraw => {
                msg!("Instruction: Withdraw");
                Self::process_withdraw(program_id, accounts)
            }
            VaultInstruction::CloseVault => {
                msg!("Instruction: CloseVault");
                Self::process_close_vault(program_id, accounts)
            }
        }
    }

    fn process_create_vault(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        lock_duration_days: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let owner_info = next_account_info(account_info_iter)?;
        let vault_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        Self::validate_signer(owner_info)?;
        Self::validate_writable(vault_info)?;
        Self::validate_system_program(system_program_info)?;

        let bump = VaultPDA::verify(program_id, owner_info.key, vault_info.key)?;
        let prior = Self::load_vault(program_id, vault_info)?;
        let now = Clock::get()?.unix_timestamp;

        let vault = custody::create_vault(prior.as_ref(), owner_info.key, lock_duration_days, now, bump)?;

        Self::allocate_vault(program_id, owner_info, vault_info, system_program_info, bump)?;
        vault.pack(&mut vault_info.try_borrow_mut_data()?)?;

        msg!(
            "Vault created for {}: lock {} days, unlocks at {}",
            owner_info.key,
            lock_duration_days,
            vault.unlock_time
        );
        Ok(())
    }

    fn process_deposit(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        amount: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let owner_info = next_account_info(account_info_iter)?;
        let vault_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        Self::validate_signer(caller_info)?;
        Self::validate_writable(vault_info)?;
        Self::validate_system_program(system_program_info)?;

        VaultPDA::verify(program_id, owner_info.key, vault_info.key)?;
        let prior = Self::load_vault(program_id, vault_info)?;

        let Transition { vault, movement } = custody::deposit(prior.as_ref(), caller_info.key, amount)?;

        if let Movement::IntoVault(lamports) = movement {
            invoke(
                &system_instruction::transfer(caller_info.key, vault_info.key, lamports),
                &[caller_info.clone(), vault_info.clone(), system_program_info.clone()],
            )?;
        }
        vault.pack(&mut vault_info.try_borrow_mut_data()?)?;

        msg!("Deposited {} lamports, balance now {}", amount, vault.balance);
        Ok(())
    }

    fn process_withdraw(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let owner_info = next_account_info(account_info_iter)?;
        let vault_info = next_account_info(account_info_iter)?;

        Self::validate_signer(caller_info)?;
        Self::validate_writable(vault_info)?;

        VaultPDA::verify(program_id, owner_info.key, vault_info.key)?;
        let prior = Self::load_vault(program_id, vault_info)?;
        let now = Clock::get()?.unix_timestamp;

        let Transition { vault, movement } = custody::withdraw(prior.as_ref(), caller_info.key, now)?;

        if let Some(prior) = prior.as_ref() {
            Self::reconcile(vault_info, prior)?;
        }

        let mut released = 0;
        if let Movement::OutOfVault(lamports) = movement {
            Self::move_lamports(vault_info, caller_info, lamports)?;
            released = lamports;
        }
        vault.pack(&mut vault_info.try_borrow_mut_data()?)?;

        msg!("Withdrew {} lamports to {}", released, caller_info.key);
        Ok(())
    }

    fn process_close_vault(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let owner_info = next_account_info(account_info_iter)?;
        let vault_info = next_account_info(account_info_iter)?;

        Self::validate_signer(owner_info)?;
        Self::validate_writable(vault_info)?;

        VaultPDA::verify(program_id, owner_info.key, vault_info.key)?;
        let prior = Self::load_vault(program_id, vault_info)?;

        custody::close_vault(prior.as_ref(), owner_info.key)?;

        if let Some(prior) = prior.as_ref() {
            Self::reconcile(vault_info, prior)?;
        }

        // Zero lamports and zeroed data: the runtime drops the account after
        // this transaction, so the owner's address reads as absent again.
        let refund = vault_info.lamports();
        Self::move_lamports(vault_info, owner_info, refund)?;
        vault_info.try_borrow_mut_data()?.fill(0);

        msg!("Vault closed for {}, refunded {} lamports", owner_info.key, refund);
        Ok(())
    }

    /// `None` for an address that has never held a vault
    fn load_vault(program_id: &Pubkey, vault_info: &AccountInfo) -> Result<Option<Vault>, ProgramError> {
        if vault_info.owner != program_id {
            if vault_info.data_is_empty() {
                return Ok(None);
            }
            msg!(
                "Account owner mismatch. Expected: {}, Actual: {}",
                program_id,
                vault_info.owner
            );
            return Err(ProgramError::IncorrectProgramId);
        }

        let data = vault_info.try_borrow_data()?;
        Vault::unpack(&data).map(Some)
    }

    /// Create the PDA account sized for a vault. A PDA already holding
    /// lamports cannot go through `create_account`, so it is topped up,
    /// allocated and assigned instead.
    fn allocate_vault<'a>(
        program_id: &Pubkey,
        payer_info: &AccountInfo<'a>,
        vault_info: &AccountInfo<'a>,
        system_program_info: &AccountInfo<'a>,
        bump: u8,
    ) -> ProgramResult {
        let rent = Rent::get()?;
        let required_lamports = rent.minimum_balance(Vault::LEN);
        let signer_seeds: &[&[u8]] = &[seeds::VAULT, payer_info.key.as_ref(), &[bump]];

        if vault_info.lamports() == 0 {
            return invoke_signed(
                &system_instruction::create_account(
                    payer_info.key,
                    vault_info.key,
                    required_lamports,
                    Vault::LEN as u64,
                    program_id,
                ),
                &[payer_info.clone(), vault_info.clone(), system_program_info.clone()],
                &[signer_seeds],
            );
        }

        let shortfall = required_lamports.saturating_sub(vault_info.lamports());
        if shortfall > 0 {
            invoke(
                &system_instruction::transfer(payer_info.key, vault_info.key, shortfall),
                &[payer_info.clone(), vault_info.clone(), system_program_info.clone()],
            )?;
        }

        invoke_signed(
            &system_instruction::allocate(vault_info.key, Vault::LEN as u64),
            &[vault_info.clone(), system_program_info.clone()],
            &[signer_seeds],
        )?;

        invoke_signed(
            &system_instruction::assign(vault_info.key, program_id),
            &[vault_info.clone(), system_program_info.clone()],
            &[signer_seeds],
        )
    }

    /// Backing lamports must cover the rent reserve plus the recorded balance
    fn reconcile(vault_info: &AccountInfo, vault: &Vault) -> ProgramResult {
        let reserve = Rent::get()?.minimum_balance(Vault::LEN);
        let required = reserve
            .checked_add(vault.balance)
            .ok_or(VaultError::Overflow)?;

        if vault_info.lamports() < required {
            msg!(
                "Vault lamports {} below reserve {} + balance {}",
                vault_info.lamports(),
                reserve,
                vault.balance
            );
            return Err(VaultError::BalanceMismatch.into());
        }
        Ok(())
    }

    fn move_lamports(from: &AccountInfo, to: &AccountInfo, amount: u64) -> ProgramResult {
        let from_lamports = from
            .lamports()
            .checked_sub(amount)
            .ok_or(VaultError::Overflow)?;
        let to_lamports = to
            .lamports()
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;

        **from.try_borrow_mut_lamports()? = from_lamports;
        **to.try_borrow_mut_lamports()? = to_lamports;
        Ok(())
    }

    fn validate_signer(account: &AccountInfo) -> ProgramResult {
        if !account.is_signer {
            msg!("Account {} must be a signer", account.key);
            return Err(ProgramError::MissingRequiredSignature);
        }
        Ok(())
    }

    fn validate_writable(account: &AccountInfo) -> ProgramResult {
        if !account.is_writable {
            msg!("Account {} must be writable", account.key);
            return Err(ProgramError::InvalidAccountData);
        }
        Ok(())
    }

    fn validate_system_program(account: &AccountInfo) -> ProgramResult {
        if account.key != &system_program::id() {
            msg!("Invalid system program");
            return Err(ProgramError::IncorrectProgramId);
        }
        Ok(())
    }
}

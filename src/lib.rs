//! In-memory retail bank: customers, accounts and a deposit/withdrawal
//! ledger with a rolling daily withdrawal limit.

pub mod account;
pub mod bank;
pub mod cli;
pub mod config;
pub mod customer;
pub mod error;
pub mod money;

pub use account::{Account, Amount, Extract, Transaction, TransactionKind, BRANCH};
pub use bank::Bank;
pub use cli::{run_app, Session};
pub use config::{Config, WithdrawalLimits};
pub use customer::{parse_birth_date, Address, Customer, CustomerId};
pub use error::{BankError, CliError};

pub fn init_bank() -> anyhow::Result<Bank> {
    let config = config::Config::from_env()?;
    log::debug!("Withdrawal limits: {:?}", config.limits);
    Ok(Bank::with_config(config))
}

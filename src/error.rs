use rust_decimal::Decimal;
use thiserror::Error;

use crate::customer::CustomerId;
use crate::money::format_brl;

/// Validation failures reported by the ledger and the registry.
/// None of them is fatal; the caller decides what to tell the operator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(Decimal),
    #[error(
        "Withdrawal of {} exceeds the per-withdrawal limit of {}",
        format_brl(.amount),
        format_brl(.limit)
    )]
    LimitExceeded { amount: Decimal, limit: Decimal },
    #[error("Amount {0} would overflow the balance")]
    AmountTooLarge(Decimal),
    #[error("Daily withdrawal limit of {0} reached")]
    DailyLimitReached(usize),
    #[error(
        "Insufficient funds: balance is {}, requested {}",
        format_brl(.balance),
        format_brl(.requested)
    )]
    InsufficientFunds { balance: Decimal, requested: Decimal },
    #[error("Identifier '{0}' must have exactly 11 digits")]
    InvalidIdentifier(String),
    #[error("Customer {0} is already registered")]
    DuplicateCustomer(CustomerId),
    #[error("Customer '{0}' not found")]
    CustomerNotFound(String),
    #[error("Account {0:04} not found")]
    AccountNotFound(u32),
    #[error("Invalid date '{0}', expected dd/mm/yyyy")]
    InvalidDate(String),
    #[error("No account numbers left to assign")]
    AccountNumbersExhausted,
    #[error("Name must not be empty")]
    EmptyName,
    #[error("Invalid address: {0}")]
    InvalidAddress(&'static str),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error("Console I/O error")]
    IOError(#[from] std::io::Error),
    #[error("End of input")]
    EndOfInput,
}

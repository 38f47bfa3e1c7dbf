use std::fmt::Display;

use chrono::{DateTime, Local, Utc};
use rust_decimal::Decimal;

use crate::config::WithdrawalLimits;
use crate::customer::CustomerId;
use crate::error::BankError;
use crate::money::format_brl;

pub const BRANCH: &str = "0001";

pub type Amount = Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "Deposit"),
            TransactionKind::Withdrawal => write!(f, "Withdrawal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    kind: TransactionKind,
    amount: Amount,
    timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {}: {}",
            self.timestamp
                .with_timezone(&Local)
                .format("%d/%m/%Y %H:%M:%S"),
            self.kind,
            format_brl(&self.amount)
        )
    }
}

#[derive(Debug)]
pub struct Account {
    number: u32,
    owner: CustomerId,
    balance: Amount,
    transactions: Vec<Transaction>,
    limits: WithdrawalLimits,
}

impl Account {
    pub(crate) fn new(number: u32, owner: CustomerId, limits: WithdrawalLimits) -> Account {
        Account {
            number,
            owner,
            balance: Amount::ZERO,
            transactions: Vec::new(),
            limits,
        }
    }

    pub fn branch(&self) -> &'static str {
        BRANCH
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn owner(&self) -> &CustomerId {
        &self.owner
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn limits(&self) -> &WithdrawalLimits {
        &self.limits
    }

    pub fn deposit(&mut self, amount: Amount) -> Result<Amount, BankError> {
        self.deposit_at(amount, Utc::now())
    }

    pub fn deposit_at(&mut self, amount: Amount, now: DateTime<Utc>) -> Result<Amount, BankError> {
        if amount <= Amount::ZERO {
            return Err(BankError::InvalidAmount(amount));
        }
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(BankError::AmountTooLarge(amount))?;
        let now = self.stamp(now);
        self.balance = balance;
        self.record(TransactionKind::Deposit, amount, now);
        Ok(self.balance)
    }

    pub fn withdraw(&mut self, amount: Amount) -> Result<Amount, BankError> {
        self.withdraw_at(amount, Utc::now())
    }

    /// Checks run in a fixed order and the first failure is reported:
    /// sign, per-withdrawal limit, rolling window count, then balance.
    pub fn withdraw_at(&mut self, amount: Amount, now: DateTime<Utc>) -> Result<Amount, BankError> {
        if amount <= Amount::ZERO {
            return Err(BankError::InvalidAmount(amount));
        }
        if amount > self.limits.per_withdrawal {
            return Err(BankError::LimitExceeded {
                amount,
                limit: self.limits.per_withdrawal,
            });
        }
        let now = self.stamp(now);
        let recent = self.withdrawals_in_window(now);
        log::debug!(
            "Account {:04}: {} withdrawal(s) in the current window",
            self.number,
            recent
        );
        if recent >= self.limits.per_window {
            return Err(BankError::DailyLimitReached(self.limits.per_window));
        }
        if amount > self.balance {
            return Err(BankError::InsufficientFunds {
                balance: self.balance,
                requested: amount,
            });
        }
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(BankError::AmountTooLarge(amount))?;
        self.record(TransactionKind::Withdrawal, amount, now);
        Ok(self.balance)
    }

    /// Withdrawals stamped less than one window before `now`.
    pub fn withdrawals_in_window(&self, now: DateTime<Utc>) -> usize {
        let window = self.limits.window();
        self.transactions
            .iter()
            .filter(|tx| tx.kind == TransactionKind::Withdrawal)
            .filter(|tx| now.signed_duration_since(tx.timestamp) < window)
            .count()
    }

    pub fn extract(&self) -> Extract<'_> {
        Extract {
            branch: BRANCH,
            number: self.number,
            transactions: &self.transactions,
            balance: self.balance,
        }
    }

    /// History stays chronological: a `now` older than the last record
    /// is moved up to that record's timestamp.
    fn stamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.transactions.last() {
            Some(last) if now < last.timestamp => {
                log::warn!(
                    "Account {:04}: clock behind last record ({} < {}), using {}",
                    self.number,
                    now,
                    last.timestamp,
                    last.timestamp
                );
                last.timestamp
            }
            _ => now,
        }
    }

    fn record(&mut self, kind: TransactionKind, amount: Amount, timestamp: DateTime<Utc>) {
        self.transactions.push(Transaction {
            kind,
            amount,
            timestamp,
        });
    }
}

impl Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Account {:04} (Branch {}) - Balance: {}",
            self.number,
            BRANCH,
            format_brl(&self.balance)
        )
    }
}

/// Statement view of an account: full history plus current balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extract<'a> {
    pub branch: &'static str,
    pub number: u32,
    pub transactions: &'a [Transaction],
    pub balance: Amount,
}

impl Display for Extract<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Branch: {} | Account: {:04}", self.branch, self.number)?;
        writeln!(f, "Transactions:")?;
        if self.transactions.is_empty() {
            writeln!(f, "No transactions recorded.")?;
        }
        for tx in self.transactions {
            writeln!(f, "{}", tx)?;
        }
        write!(f, "Balance: {}", format_brl(&self.balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn account() -> Account {
        Account::new(
            1,
            CustomerId::parse("12345678909").unwrap(),
            WithdrawalLimits::default(),
        )
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn deposit_adds_to_balance_and_history() {
        let mut acc = account();
        assert_eq!(acc.deposit_at(dec!(150.25), noon()), Ok(dec!(150.25)));
        assert_eq!(acc.deposit_at(dec!(49.75), noon()), Ok(dec!(200.00)));
        assert_eq!(acc.balance(), dec!(200));

        let extract = acc.extract();
        assert_eq!(extract.transactions.len(), 2);
        assert_eq!(extract.transactions[0].kind(), TransactionKind::Deposit);
        assert_eq!(extract.transactions[0].amount(), dec!(150.25));
        assert_eq!(extract.transactions[0].timestamp(), noon());
    }

    #[test]
    fn deposit_rejects_non_positive() {
        let mut acc = account();
        assert_eq!(acc.deposit(dec!(0)), Err(BankError::InvalidAmount(dec!(0))));
        assert_eq!(
            acc.deposit(dec!(-10)),
            Err(BankError::InvalidAmount(dec!(-10)))
        );
        assert_eq!(acc.balance(), Amount::ZERO);
        assert!(acc.extract().transactions.is_empty());
    }

    #[test]
    fn withdraw_checks_run_in_order() {
        let mut acc = account();
        // Empty account: the limit check still wins over insufficient funds.
        assert_eq!(
            acc.withdraw_at(dec!(600), noon()),
            Err(BankError::LimitExceeded {
                amount: dec!(600),
                limit: dec!(500)
            })
        );
        assert_eq!(
            acc.withdraw_at(dec!(-600), noon()),
            Err(BankError::InvalidAmount(dec!(-600)))
        );
        assert_eq!(
            acc.withdraw_at(dec!(10), noon()),
            Err(BankError::InsufficientFunds {
                balance: dec!(0),
                requested: dec!(10)
            })
        );
        assert!(acc.extract().transactions.is_empty());
    }

    #[test]
    fn window_limit_wins_over_funds() {
        let mut acc = account();
        acc.deposit_at(dec!(30), noon()).unwrap();
        for _ in 0..3 {
            acc.withdraw_at(dec!(10), noon()).unwrap();
        }
        assert_eq!(acc.balance(), dec!(0));
        assert_eq!(
            acc.withdraw_at(dec!(1), noon()),
            Err(BankError::DailyLimitReached(3))
        );
        assert_eq!(acc.extract().transactions.len(), 4);
    }

    #[test]
    fn rolling_window_releases_oldest_withdrawal() {
        let mut acc = account();
        let start = noon();
        acc.deposit_at(dec!(1000), start).unwrap();
        acc.withdraw_at(dec!(100), start).unwrap();
        acc.withdraw_at(dec!(100), start + Duration::hours(6)).unwrap();
        acc.withdraw_at(dec!(100), start + Duration::hours(12)).unwrap();

        let almost = start + Duration::hours(24) - Duration::seconds(1);
        assert_eq!(acc.withdrawals_in_window(almost), 3);
        assert_eq!(
            acc.withdraw_at(dec!(100), almost),
            Err(BankError::DailyLimitReached(3))
        );

        let released = start + Duration::hours(24);
        assert_eq!(acc.withdrawals_in_window(released), 2);
        assert_eq!(acc.withdraw_at(dec!(100), released), Ok(dec!(600)));
        assert_eq!(acc.withdrawals_in_window(released), 3);
    }

    #[test]
    fn deposits_do_not_count_toward_window() {
        let mut acc = account();
        for _ in 0..5 {
            acc.deposit_at(dec!(100), noon()).unwrap();
        }
        assert_eq!(acc.withdrawals_in_window(noon()), 0);
        assert!(acc.withdraw_at(dec!(100), noon()).is_ok());
    }

    #[test]
    fn custom_limits_apply() {
        let limits = WithdrawalLimits {
            per_withdrawal: dec!(50),
            per_window: 1,
            window_hours: 1,
        };
        let mut acc = Account::new(7, CustomerId::parse("98765432100").unwrap(), limits);
        acc.deposit_at(dec!(200), noon()).unwrap();
        assert!(matches!(
            acc.withdraw_at(dec!(51), noon()),
            Err(BankError::LimitExceeded { .. })
        ));
        acc.withdraw_at(dec!(50), noon()).unwrap();
        assert_eq!(
            acc.withdraw_at(dec!(50), noon() + Duration::minutes(59)),
            Err(BankError::DailyLimitReached(1))
        );
        assert!(acc.withdraw_at(dec!(50), noon() + Duration::hours(1)).is_ok());
    }

    #[test]
    fn deposit_overflow_is_rejected_without_side_effects() {
        let mut acc = account();
        acc.deposit_at(Amount::MAX, noon()).unwrap();
        assert_eq!(
            acc.deposit_at(dec!(1), noon()),
            Err(BankError::AmountTooLarge(dec!(1)))
        );
        assert_eq!(acc.balance(), Amount::MAX);
        assert_eq!(acc.extract().transactions.len(), 1);
    }

    #[test]
    fn limit_check_wins_over_window_check() {
        let mut acc = account();
        acc.deposit_at(dec!(1000), noon()).unwrap();
        for _ in 0..3 {
            acc.withdraw_at(dec!(100), noon()).unwrap();
        }
        assert_eq!(
            acc.withdraw_at(dec!(600), noon()),
            Err(BankError::LimitExceeded {
                amount: dec!(600),
                limit: dec!(500)
            })
        );
        assert_eq!(acc.balance(), dec!(700));
        assert_eq!(acc.extract().transactions.len(), 4);
    }

    #[test]
    fn earlier_timestamps_are_moved_up_to_the_last_record() {
        let mut acc = account();
        let morning = noon() - Duration::hours(5);
        acc.deposit_at(dec!(10), noon()).unwrap();
        assert_eq!(acc.deposit_at(dec!(10), morning), Ok(dec!(20)));
        acc.withdraw_at(dec!(5), morning).unwrap();

        let stamps: Vec<DateTime<Utc>> = acc
            .extract()
            .transactions
            .iter()
            .map(Transaction::timestamp)
            .collect();
        assert_eq!(stamps, vec![noon(), noon(), noon()]);
        assert_eq!(acc.withdrawals_in_window(noon()), 1);
    }

    #[test]
    fn extract_is_idempotent() {
        let mut acc = account();
        acc.deposit_at(dec!(100), noon()).unwrap();
        acc.withdraw_at(dec!(40), noon()).unwrap();
        let first = acc.extract();
        let second = acc.extract();
        assert_eq!(first, second);
        assert_eq!(first.balance, dec!(60));
        assert_eq!(first.branch, "0001");
        assert_eq!(first.number, 1);
    }

    #[test]
    fn display_formats() {
        let mut acc = account();
        assert_eq!(
            acc.to_string(),
            "Account 0001 (Branch 0001) - Balance: R$ 0,00"
        );
        assert!(acc.extract().to_string().contains("No transactions recorded."));

        acc.deposit_at(dec!(1234.5), noon()).unwrap();
        let statement = acc.extract().to_string();
        assert!(statement.contains("Deposit: R$ 1.234,50"));
        assert!(statement.ends_with("Balance: R$ 1.234,50"));
    }
}

use std::fmt::Display;

use chrono::NaiveDate;
use hashbrown::HashMap;

use crate::account::{Account, Amount};
use crate::config::Config;
use crate::customer::{Address, Customer, CustomerId};
use crate::error::BankError;

/// Owns every customer and account. Accounts refer to their owner by
/// `CustomerId`; accounts-by-customer is computed on demand.
#[derive(Debug)]
pub struct Bank {
    config: Config,
    customers: Vec<Customer>,
    customer_index: HashMap<CustomerId, usize>,
    accounts: Vec<Account>,
    account_index: HashMap<u32, usize>,
    next_account_number: u32,
}

impl Default for Bank {
    fn default() -> Self {
        Bank::new()
    }
}

impl Bank {
    pub fn new() -> Bank {
        Bank::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Bank {
        Bank {
            config,
            customers: Vec::new(),
            customer_index: HashMap::new(),
            accounts: Vec::new(),
            account_index: HashMap::new(),
            next_account_number: 1,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn register_customer(
        &mut self,
        id: &str,
        name: &str,
        birth_date: NaiveDate,
        address: Address,
    ) -> Result<&Customer, BankError> {
        let id = CustomerId::parse(id)?;
        if self.customer_index.contains_key(&id) {
            log::warn!("Rejected duplicate customer {}", id);
            return Err(BankError::DuplicateCustomer(id));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(BankError::EmptyName);
        }

        let position = self.customers.len();
        self.customer_index.insert(id.clone(), position);
        self.customers
            .push(Customer::new(id, name.to_string(), birth_date, address));
        log::info!("Registered customer {}", self.customers[position].id());
        Ok(&self.customers[position])
    }

    pub fn open_account(&mut self, customer_id: &str) -> Result<&Account, BankError> {
        let owner = match self.find_customer(customer_id) {
            Some(customer) => customer.id().clone(),
            None => return Err(BankError::CustomerNotFound(customer_id.trim().to_string())),
        };

        let number = self.next_account_number;
        self.next_account_number = number
            .checked_add(1)
            .ok_or(BankError::AccountNumbersExhausted)?;

        let position = self.accounts.len();
        self.account_index.insert(number, position);
        self.accounts
            .push(Account::new(number, owner, self.config.limits.clone()));
        log::info!(
            "Opened account {:04} for customer {}",
            number,
            self.accounts[position].owner()
        );
        Ok(&self.accounts[position])
    }

    /// Accepts formatted identifiers; malformed ones are simply not found.
    pub fn find_customer(&self, id: &str) -> Option<&Customer> {
        let id = CustomerId::parse(id).ok()?;
        self.customer_index
            .get(&id)
            .map(|&position| &self.customers[position])
    }

    pub fn find_account(&self, number: u32) -> Option<&Account> {
        self.account_index
            .get(&number)
            .map(|&position| &self.accounts[position])
    }

    pub fn account_mut(&mut self, number: u32) -> Result<&mut Account, BankError> {
        match self.account_index.get(&number) {
            Some(&position) => Ok(&mut self.accounts[position]),
            None => Err(BankError::AccountNotFound(number)),
        }
    }

    pub fn deposit(&mut self, number: u32, amount: Amount) -> Result<Amount, BankError> {
        let result = self.account_mut(number)?.deposit(amount);
        log_movement("Deposit", number, amount, &result);
        result
    }

    pub fn withdraw(&mut self, number: u32, amount: Amount) -> Result<Amount, BankError> {
        let result = self.account_mut(number)?.withdraw(amount);
        log_movement("Withdrawal", number, amount, &result);
        result
    }

    pub fn accounts_of(&self, customer_id: &str) -> Vec<&Account> {
        match CustomerId::parse(customer_id) {
            Ok(id) => self
                .accounts
                .iter()
                .filter(|account| account.owner() == &id)
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn owner_of(&self, account: &Account) -> Option<&Customer> {
        self.customer_index
            .get(account.owner())
            .map(|&position| &self.customers[position])
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }
}

fn log_movement(kind: &str, number: u32, amount: Amount, result: &Result<Amount, BankError>) {
    match result {
        Ok(balance) => log::info!(
            "{} of {} on account {:04}, balance {}",
            kind,
            amount,
            number,
            balance
        ),
        Err(err) => log::warn!("{} on account {:04} rejected: {}", kind, number, err),
    }
}

impl Display for Bank {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.accounts.iter().fold(Ok(()), |result, account| {
            result.and_then(|_| match self.owner_of(account) {
                Some(owner) => writeln!(f, "{} - Holder: {}", account, owner.name()),
                None => writeln!(f, "{}", account),
            })
        })
    }
}

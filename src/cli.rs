use std::collections::HashSet;
use std::io::{self, BufRead, Write};

use crate::account::Amount;
use crate::bank::Bank;
use crate::customer::{parse_birth_date, Address, CustomerId};
use crate::error::{BankError, CliError};
use crate::money::{format_brl, parse_amount};

const RULE: &str = "==================================================";

/// Text menus over a `Bank`. Reads from any `BufRead` so sessions can be
/// scripted; end of input behaves like choosing "exit".
pub struct Session<R, W> {
    bank: Bank,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(bank: Bank, input: R, output: W) -> Session<R, W> {
        Session {
            bank,
            input,
            output,
        }
    }

    pub fn into_parts(self) -> (Bank, W) {
        (self.bank, self.output)
    }

    pub fn run(&mut self) -> Result<(), CliError> {
        match self.main_menu() {
            Err(CliError::EndOfInput) => {
                log::debug!("Input closed, leaving the session");
                writeln!(self.output)?;
                Ok(())
            }
            other => other,
        }
    }

    fn main_menu(&mut self) -> Result<(), CliError> {
        loop {
            self.print_main_menu()?;
            let option = self.get_valid_option(&["1", "2", "3", "4", "5", "6"])?;
            let outcome = match option.as_str() {
                "1" => self.register_customer(),
                "2" => self.open_account(),
                "3" => self.access_account(),
                "4" => self.list_accounts(),
                "5" => self.list_customers(),
                "6" => {
                    writeln!(self.output, "\nThank you for banking with us!")?;
                    return Ok(());
                }
                _ => unreachable!(),
            };
            self.report(outcome)?;
        }
    }

    /// Prints domain errors and carries on; anything else ends the session.
    fn report(&mut self, outcome: Result<(), CliError>) -> Result<(), CliError> {
        match outcome {
            Err(CliError::Bank(err)) => {
                writeln!(self.output, "Error: {}", err)?;
                Ok(())
            }
            other => other,
        }
    }

    fn print_main_menu(&mut self) -> io::Result<()> {
        writeln!(
            self.output,
            "\n{:=^50}
1 - New customer
2 - New account
3 - Access account
4 - List accounts
5 - List customers
6 - Exit",
            " BANK "
        )
    }

    fn register_customer(&mut self) -> Result<(), CliError> {
        writeln!(self.output, "\n--- New customer ---")?;
        let raw_id = self.prompt_and_get_input("ID (11 digits)")?;
        let id = CustomerId::parse(&raw_id)?;
        if self.bank.find_customer(id.as_str()).is_some() {
            return Err(BankError::DuplicateCustomer(id).into());
        }

        let name = self.prompt_and_get_input("Full name")?;
        if name.is_empty() {
            return Err(BankError::EmptyName.into());
        }
        let birth_date = parse_birth_date(&self.prompt_and_get_input("Birth date (dd/mm/yyyy)")?)?;

        let street = self.prompt_and_get_input("Street")?;
        let number = self.prompt_and_get_input("Number")?;
        let district = self.prompt_and_get_input("District")?;
        let city = self.prompt_and_get_input("City")?;
        let state = self.prompt_and_get_input("State (2 letters)")?;
        let address = Address::new(&street, &number, &district, &city, &state)?;

        let customer = self
            .bank
            .register_customer(id.as_str(), &name, birth_date, address)?;
        let message = format!("Customer {} registered.", customer.name());
        writeln!(self.output, "{}", message)?;
        Ok(())
    }

    fn open_account(&mut self) -> Result<(), CliError> {
        writeln!(self.output, "\n--- New account ---")?;
        let customer_id = self.prompt_and_get_input("Holder ID")?;
        let number = self.bank.open_account(&customer_id)?.number();
        let holder = self
            .bank
            .find_customer(&customer_id)
            .map(|customer| customer.name().to_string())
            .unwrap_or_default();
        writeln!(self.output, "Account {:04} opened for {}.", number, holder)?;
        Ok(())
    }

    fn access_account(&mut self) -> Result<(), CliError> {
        let customer_id = self.prompt_and_get_input("Holder ID")?;
        if let Some(number) = self.select_account(&customer_id)? {
            self.account_menu(number)?;
        }
        Ok(())
    }

    fn select_account(&mut self, customer_id: &str) -> Result<Option<u32>, CliError> {
        if self.bank.find_customer(customer_id).is_none() {
            return Err(BankError::CustomerNotFound(customer_id.to_string()).into());
        }
        let choices: Vec<(u32, String)> = self
            .bank
            .accounts_of(customer_id)
            .into_iter()
            .map(|account| (account.number(), format_brl(&account.balance())))
            .collect();

        match choices.as_slice() {
            [] => {
                writeln!(self.output, "No accounts found for ID {}.", customer_id)?;
                Ok(None)
            }
            [(number, _)] => {
                writeln!(self.output, "Account {:04} selected.", number)?;
                Ok(Some(*number))
            }
            _ => {
                writeln!(self.output, "\nYour accounts:")?;
                for (i, (number, balance)) in choices.iter().enumerate() {
                    writeln!(
                        self.output,
                        "{}. Account {:04} - Balance: {}",
                        i + 1,
                        number,
                        balance
                    )?;
                }
                loop {
                    let choice = self.prompt_and_get_input("Choose an account")?;
                    match choice.parse::<usize>() {
                        Ok(i) if (1..=choices.len()).contains(&i) => {
                            return Ok(Some(choices[i - 1].0))
                        }
                        Ok(_) => writeln!(self.output, "Invalid option.")?,
                        Err(_) => writeln!(self.output, "Invalid input, type a number.")?,
                    }
                }
            }
        }
    }

    fn account_menu(&mut self, number: u32) -> Result<(), CliError> {
        loop {
            let holder = self
                .bank
                .find_account(number)
                .and_then(|account| self.bank.owner_of(account))
                .map(|customer| customer.name().to_string())
                .unwrap_or_default();
            writeln!(
                self.output,
                "\n{:=^50}
Account: {:04} | Holder: {}
1 - Deposit
2 - Withdraw
3 - Extract
4 - Back",
                " OPERATIONS ",
                number,
                holder
            )?;

            let option = self.get_valid_option(&["1", "2", "3", "4"])?;
            let outcome = match option.as_str() {
                "1" => self.deposit(number),
                "2" => self.withdraw(number),
                "3" => self.show_extract(number),
                "4" => return Ok(()),
                _ => unreachable!(),
            };
            self.report(outcome)?;
        }
    }

    fn deposit(&mut self, number: u32) -> Result<(), CliError> {
        let Some(amount) = self.prompt_amount("Deposit amount: R$")? else {
            return Ok(());
        };
        let balance = self.bank.deposit(number, amount)?;
        writeln!(self.output, "Deposit done. Balance: {}", format_brl(&balance))?;
        Ok(())
    }

    fn withdraw(&mut self, number: u32) -> Result<(), CliError> {
        let Some(amount) = self.prompt_amount("Withdrawal amount: R$")? else {
            return Ok(());
        };
        let balance = self.bank.withdraw(number, amount)?;
        writeln!(
            self.output,
            "Withdrawal done. Balance: {}",
            format_brl(&balance)
        )?;
        Ok(())
    }

    fn show_extract(&mut self, number: u32) -> Result<(), CliError> {
        let account = self
            .bank
            .find_account(number)
            .ok_or(BankError::AccountNotFound(number))?;
        let holder = self
            .bank
            .owner_of(account)
            .map(|customer| customer.name())
            .unwrap_or_default();
        writeln!(
            self.output,
            "\n{:=^50}\nHolder: {}\n{}\n{}",
            " EXTRACT ",
            holder,
            account.extract(),
            RULE
        )?;
        Ok(())
    }

    fn list_accounts(&mut self) -> Result<(), CliError> {
        writeln!(self.output, "\n{:=^50}", " ACCOUNTS ")?;
        if self.bank.accounts().is_empty() {
            writeln!(self.output, "No accounts registered.")?;
        } else {
            write!(self.output, "{}", self.bank)?;
        }
        writeln!(self.output, "{}", RULE)?;
        Ok(())
    }

    fn list_customers(&mut self) -> Result<(), CliError> {
        writeln!(self.output, "\n{:=^50}", " CUSTOMERS ")?;
        if self.bank.customers().is_empty() {
            writeln!(self.output, "No customers registered.")?;
        }
        for customer in self.bank.customers() {
            writeln!(self.output, "{}", customer)?;
        }
        writeln!(self.output, "{}", RULE)?;
        Ok(())
    }

    /// `None` when the text is not a number; the operator is told why.
    fn prompt_amount(&mut self, prompt: &str) -> Result<Option<Amount>, CliError> {
        let raw = self.prompt_and_get_input(prompt)?;
        let amount = parse_amount(&raw);
        if amount.is_none() {
            writeln!(self.output, "Error: '{}' is not a valid amount", raw)?;
        }
        Ok(amount)
    }

    fn prompt_and_get_input(&mut self, prompt: &str) -> Result<String, CliError> {
        write!(self.output, "{}: ", prompt)?;
        self.output.flush()?;
        self.read_line()
    }

    fn get_valid_option(&mut self, options: &[&str]) -> Result<String, CliError> {
        let valid_inputs: HashSet<&str> = options.iter().copied().collect();

        loop {
            let user_input = self.prompt_and_get_input("Option")?;
            if valid_inputs.contains(user_input.as_str()) {
                return Ok(user_input);
            }
            writeln!(self.output, "Invalid option, try again.")?;
        }
    }

    fn read_line(&mut self) -> Result<String, CliError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(CliError::EndOfInput);
        }
        Ok(line.trim().to_string())
    }
}

pub fn run_app(bank: Bank) -> Result<(), CliError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    Session::new(bank, stdin.lock(), stdout.lock()).run()
}

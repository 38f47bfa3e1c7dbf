use std::fmt::Display;

use chrono::NaiveDate;

use crate::error::BankError;

pub const ID_DIGITS: usize = 11;
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// An 11-digit customer identifier with formatting characters removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomerId(String);

impl CustomerId {
    /// Strips every non-digit and checks that 11 digits remain,
    /// so `123.456.789-09` and `12345678909` are the same id.
    pub fn parse(raw: &str) -> Result<CustomerId, BankError> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != ID_DIGITS {
            return Err(BankError::InvalidIdentifier(raw.trim().to_string()));
        }
        Ok(CustomerId(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn parse_birth_date(input: &str) -> Result<NaiveDate, BankError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| BankError::InvalidDate(input.trim().to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    street: String,
    number: String,
    district: String,
    city: String,
    state: String,
}

impl Address {
    pub fn new(
        street: &str,
        number: &str,
        district: &str,
        city: &str,
        state: &str,
    ) -> Result<Address, BankError> {
        let parts = [street, number, district, city, state].map(str::trim);
        if parts.iter().any(|part| part.is_empty()) {
            return Err(BankError::InvalidAddress("every field is required"));
        }
        let [street, number, district, city, state] = parts;
        if state.chars().count() != 2 {
            return Err(BankError::InvalidAddress(
                "state must be a two-letter code",
            ));
        }
        Ok(Address {
            street: street.to_string(),
            number: number.to_string(),
            district: district.to_string(),
            city: city.to_string(),
            state: state.to_uppercase(),
        })
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {} - {} - {}/{}",
            self.street, self.number, self.district, self.city, self.state
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    id: CustomerId,
    name: String,
    birth_date: NaiveDate,
    address: Address,
}

impl Customer {
    pub(crate) fn new(
        id: CustomerId,
        name: String,
        birth_date: NaiveDate,
        address: Address,
    ) -> Customer {
        Customer {
            id,
            name,
            birth_date,
            address,
        }
    }

    pub fn id(&self) -> &CustomerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    pub fn address(&self) -> &Address {
        &self.address
    }
}

impl Display for Customer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Name: {}, ID: {}, Born: {}",
            self.name,
            self.id,
            self.birth_date.format(DATE_FORMAT)
        )
    }
}

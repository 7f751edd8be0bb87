//! Value objects shared across the storefront domain.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display currency. Every product carries a stored price for both; the
/// resolver picks which one a request sees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Idr,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Idr => "IDR",
        }
    }

    /// Unknown codes silently fall back to USD.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "IDR" => Currency::Idr,
            _ => Currency::Usd,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storefront language.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Id,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Id => "id",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "id" => Some(Language::Id),
            _ => None,
        }
    }
}

/// Money value object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn usd(amount: Decimal) -> Self {
        Self::new(amount, Currency::Usd)
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch);
        }
        Ok(Money::new(self.amount + other.amount, self.currency))
    }

    pub fn multiply(&self, qty: u32) -> Money {
        Money::new(self.amount * Decimal::from(qty), self.currency)
    }

    pub fn format(&self) -> String {
        format_amount(self.amount, self.currency)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero(Currency::Usd)
    }
}

#[derive(Debug, Clone)]
pub enum MoneyError {
    CurrencyMismatch,
}

impl std::error::Error for MoneyError {}
impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency mismatch")
    }
}

/// IDR renders as a thousands-grouped integer with an "Rp" prefix, USD with
/// two decimals and a "$" prefix.
pub fn format_amount(amount: Decimal, currency: Currency) -> String {
    match currency {
        Currency::Idr => {
            let whole = amount.round_dp(0).normalize().to_string();
            format!("Rp {}", group_thousands(&whole))
        }
        Currency::Usd => {
            let rounded = amount.round_dp(2).to_string();
            let (whole, frac) = match rounded.split_once('.') {
                Some((w, f)) => (w.to_string(), format!("{:0<2}", f)),
                None => (rounded, "00".to_string()),
            };
            format!("${}.{}", group_thousands(&whole), frac)
        }
    }
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("{sign}{out}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_usd_formatting() {
        let amount = Decimal::from_str("1234.5").unwrap();
        assert_eq!(format_amount(amount, Currency::Usd), "$1,234.50");
    }

    #[test]
    fn test_idr_formatting() {
        assert_eq!(format_amount(Decimal::from(1234), Currency::Idr), "Rp 1,234");
        assert_eq!(
            format_amount(Decimal::from(150_000), Currency::Idr),
            "Rp 150,000"
        );
    }

    #[test]
    fn test_small_amounts_need_no_grouping() {
        assert_eq!(format_amount(Decimal::from(5), Currency::Usd), "$5.00");
        assert_eq!(format_amount(Decimal::from(999), Currency::Idr), "Rp 999");
    }

    #[test]
    fn test_unknown_currency_code_defaults_to_usd() {
        assert_eq!(Currency::from_code("NGN"), Currency::Usd);
        assert_eq!(Currency::from_code("idr"), Currency::Idr);
    }

    #[test]
    fn test_money_add() {
        let a = Money::usd(Decimal::new(100, 0));
        let b = Money::usd(Decimal::new(50, 0));
        assert_eq!(a.add(&b).unwrap().amount(), Decimal::new(150, 0));
        let c = Money::new(Decimal::ONE, Currency::Idr);
        assert!(a.add(&c).is_err());
    }
}

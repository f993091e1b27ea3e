//! Payments

use std::fmt;

use serde::Deserialize;

/// Payment method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    /// Card payment; the only method bank offers apply to
    Card,

    /// UPI transfer
    Upi,

    /// Any other method (cash on delivery, wallets, ...)
    Other(String),
}

impl From<&str> for PaymentMethod {
    fn from(value: &str) -> Self {
        match value {
            "CARD" => Self::Card,
            "UPI" => Self::Upi,
            other => Self::Other(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for PaymentMethod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;

        Ok(Self::from(value.as_str()))
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Card => f.write_str("CARD"),
            Self::Upi => f.write_str("UPI"),
            Self::Other(method) => f.write_str(method),
        }
    }
}

/// Card type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardType {
    /// Credit card
    Credit,

    /// Debit card
    Debit,
}

/// Payment details supplied at checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInfo {
    /// Payment method
    pub method: PaymentMethod,

    /// Issuing bank; only meaningful for card payments
    pub bank_name: Option<String>,

    /// Card type; only meaningful for card payments
    pub card_type: Option<CardType>,
}

impl PaymentInfo {
    /// Card payment issued by the given bank.
    pub fn card(bank_name: impl Into<String>, card_type: CardType) -> Self {
        Self {
            method: PaymentMethod::Card,
            bank_name: Some(bank_name.into()),
            card_type: Some(card_type),
        }
    }

    /// Non-card payment with no bank details.
    pub fn other(method: PaymentMethod) -> Self {
        Self {
            method,
            bank_name: None,
            card_type: None,
        }
    }

    /// Whether this payment was made by card
    pub fn is_card(&self) -> bool {
        self.method == PaymentMethod::Card
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn payment_method_parses_known_and_unknown_codes() {
        assert_eq!(PaymentMethod::from("CARD"), PaymentMethod::Card);
        assert_eq!(PaymentMethod::from("UPI"), PaymentMethod::Upi);
        assert_eq!(
            PaymentMethod::from("COD"),
            PaymentMethod::Other("COD".to_string())
        );
    }

    #[test]
    fn payment_method_is_case_sensitive() {
        assert_eq!(
            PaymentMethod::from("card"),
            PaymentMethod::Other("card".to_string())
        );
    }

    #[test]
    fn payment_method_displays_as_code() {
        assert_eq!(PaymentMethod::Card.to_string(), "CARD");
        assert_eq!(PaymentMethod::Other("COD".to_string()).to_string(), "COD");
    }

    #[test]
    fn payment_method_deserializes_from_string() -> TestResult {
        let method: PaymentMethod = serde_norway::from_str("UPI")?;

        assert_eq!(method, PaymentMethod::Upi);

        Ok(())
    }

    #[test]
    fn card_constructor_sets_bank_details() {
        let payment = PaymentInfo::card("ICICI", CardType::Credit);

        assert!(payment.is_card());
        assert_eq!(payment.bank_name.as_deref(), Some("ICICI"));
        assert_eq!(payment.card_type, Some(CardType::Credit));
    }

    #[test]
    fn other_constructor_has_no_bank_details() {
        let payment = PaymentInfo::other(PaymentMethod::Upi);

        assert!(!payment.is_card());
        assert!(payment.bank_name.is_none());
    }
}

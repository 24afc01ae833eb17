//! Currency code to display symbol lookup.
//!
//! Quote providers report ISO 4217 codes (`USD`, `EUR`, ...). The dashboard only shows a
//! symbol next to the numbers, so unknown codes map to an empty string instead of failing.
use strum_macros::{Display, EnumString};

/// Currencies with a known display symbol.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    CNY,
    INR,
    KRW,
    CAD,
    AUD,
    NZD,
    HKD,
    SGD,
    TWD,
    CHF,
    SEK,
    NOK,
    DKK,
    PLN,
    BRL,
    MXN,
    ZAR,
    ILS,
    TRY,
    THB,
    RUB,
}

impl Currency {
    /// Display symbol for the currency.
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::USD
            | Currency::CAD
            | Currency::AUD
            | Currency::NZD
            | Currency::HKD
            | Currency::SGD
            | Currency::MXN => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY | Currency::CNY => "¥",
            Currency::INR => "₹",
            Currency::KRW => "₩",
            Currency::TWD => "NT$",
            Currency::CHF => "CHF",
            Currency::SEK | Currency::NOK | Currency::DKK => "kr",
            Currency::PLN => "zł",
            Currency::BRL => "R$",
            Currency::ZAR => "R",
            Currency::ILS => "₪",
            Currency::TRY => "₺",
            Currency::THB => "฿",
            Currency::RUB => "₽",
        }
    }
}

/// Returns the display symbol for a currency code, or `""` if the code is unmapped.
pub fn currency_symbol(code: &str) -> &'static str {
    code.trim()
        .parse::<Currency>()
        .map(Currency::symbol)
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_codes() {
        assert_eq!(currency_symbol("USD"), "$");
        assert_eq!(currency_symbol("eur"), "€");
        // London listings quote in pence as "GBp".
        assert_eq!(currency_symbol("GBp"), "£");
        assert_eq!(currency_symbol("JPY"), "¥");
    }

    #[test]
    fn unknown_code_is_empty() {
        assert_eq!(currency_symbol("XYZ"), "");
        assert_eq!(currency_symbol(""), "");
    }
}

//! Contract parameters shared by every present-value computation

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ActuarialError, Result};
use crate::tables::MortalityTable;

/// Sex of the insured life, selecting the mortality column
///
/// Serialized as "M" / "F"; deserialized through `FromStr`, so JSON, CSV and
/// the CLI accept the same spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    /// Single-letter code used in table files and reports
    pub fn code(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }

    /// Lenient parsing: any code that is not recognised maps to `Female`.
    ///
    /// Legacy tariff data relies on this fallback. New callers should use
    /// `str::parse::<Sex>()`, which rejects unknown codes.
    pub fn from_code_or_female(code: &str) -> Self {
        match code.parse() {
            Ok(sex) => sex,
            Err(_) => {
                log::warn!("unrecognised sex code {:?}, defaulting to female", code);
                Sex::Female
            }
        }
    }
}

impl FromStr for Sex {
    type Err = ActuarialError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "M" | "MALE" => Ok(Sex::Male),
            "F" | "FEMALE" => Ok(Sex::Female),
            other => Err(ActuarialError::invalid(format!("unknown sex code: {:?}", other))),
        }
    }
}

impl TryFrom<String> for Sex {
    type Error = ActuarialError;

    fn try_from(code: String) -> Result<Self> {
        code.parse()
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Number of premium or annuity payments per year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PaymentFrequency {
    #[default]
    Annual,
    SemiAnnual,
    Quarterly,
    Monthly,
}

impl PaymentFrequency {
    /// Payments per year (k)
    pub fn per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Annual => 1,
            PaymentFrequency::SemiAnnual => 2,
            PaymentFrequency::Quarterly => 4,
            PaymentFrequency::Monthly => 12,
        }
    }
}

impl TryFrom<u32> for PaymentFrequency {
    type Error = ActuarialError;

    fn try_from(k: u32) -> Result<Self> {
        match k {
            1 => Ok(PaymentFrequency::Annual),
            2 => Ok(PaymentFrequency::SemiAnnual),
            4 => Ok(PaymentFrequency::Quarterly),
            12 => Ok(PaymentFrequency::Monthly),
            other => Err(ActuarialError::invalid(format!(
                "unsupported payment frequency {} (expected 1, 2, 4 or 12)",
                other
            ))),
        }
    }
}

impl From<PaymentFrequency> for u32 {
    fn from(freq: PaymentFrequency) -> u32 {
        freq.per_year()
    }
}

/// A life-insurance contract: the parameter tuple every formula is evaluated for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Identifier carried through to batch output
    #[serde(default)]
    pub contract_id: u32,

    /// Entry age x
    pub entry_age: u32,

    pub sex: Sex,

    /// Annual technical interest rate i
    pub interest_rate: f64,

    /// Contract (benefit) term n in years
    pub term: u32,

    /// Premium payment term t <= n; defaults to the contract term
    #[serde(default)]
    pub premium_term: Option<u32>,

    #[serde(default)]
    pub frequency: PaymentFrequency,

    /// Optional deferment period for annuity benefits
    #[serde(default)]
    pub deferment: Option<u32>,
}

impl Contract {
    /// Create an annual-premium contract with premiums over the whole term
    pub fn new(contract_id: u32, entry_age: u32, sex: Sex, interest_rate: f64, term: u32) -> Self {
        Self {
            contract_id,
            entry_age,
            sex,
            interest_rate,
            term,
            premium_term: None,
            frequency: PaymentFrequency::Annual,
            deferment: None,
        }
    }

    pub fn with_premium_term(mut self, premium_term: u32) -> Self {
        self.premium_term = Some(premium_term);
        self
    }

    pub fn with_frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_deferment(mut self, deferment: u32) -> Self {
        self.deferment = Some(deferment);
        self
    }

    /// Effective premium payment term
    pub fn premium_term(&self) -> u32 {
        self.premium_term.unwrap_or(self.term)
    }

    /// Payments per year k
    pub fn k(&self) -> u32 {
        self.frequency.per_year()
    }

    /// Attained age at the start of policy year `offset + 1`
    pub fn attained_age(&self, offset: u32) -> u32 {
        self.entry_age.saturating_add(offset)
    }

    /// Remaining contract term at offset
    pub fn remaining_term(&self, offset: u32) -> u32 {
        self.term.saturating_sub(offset)
    }

    /// Fail-fast check of the contract against a table.
    ///
    /// The computational functions never call this; they degrade to zero or
    /// empty results instead. Front ends call it before valuing user input.
    pub fn validate(&self, table: &MortalityTable) -> Result<()> {
        if self.term == 0 {
            return Err(ActuarialError::invalid("contract term must be positive"));
        }
        if !self.interest_rate.is_finite() || self.interest_rate < 0.0 {
            return Err(ActuarialError::invalid(format!(
                "interest rate must be non-negative, got {}",
                self.interest_rate
            )));
        }
        let premium_term = self.premium_term();
        if premium_term == 0 || premium_term > self.term {
            return Err(ActuarialError::invalid(format!(
                "premium term {} must lie in 1..={}",
                premium_term, self.term
            )));
        }
        if let Some(deferment) = self.deferment {
            if deferment > self.term {
                return Err(ActuarialError::invalid(format!(
                    "deferment {} exceeds term {}",
                    deferment, self.term
                )));
            }
        }
        if self.entry_age < table.min_age() || self.entry_age >= table.max_age() {
            return Err(ActuarialError::OutOfRange {
                table: table.name().to_string(),
                age: self.entry_age,
                min_age: table.min_age(),
                max_age: table.max_age(),
            });
        }
        if !table.ends_within(self.entry_age, self.term) {
            return Err(ActuarialError::OutOfRange {
                table: table.name().to_string(),
                age: self.entry_age.saturating_add(self.term),
                min_age: table.min_age(),
                max_age: table.max_age(),
            });
        }
        Ok(())
    }

    /// Parse a contract from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a contract from a JSON file
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sex_strict_parsing() {
        assert_eq!("M".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("f".parse::<Sex>().unwrap(), Sex::Female);
        assert_eq!(" male ".parse::<Sex>().unwrap(), Sex::Male);
        assert!("X".parse::<Sex>().is_err());
        assert!("".parse::<Sex>().is_err());
    }

    #[test]
    fn test_sex_json_uses_same_parser() {
        for (json, expected) in [
            (r#""M""#, Sex::Male),
            (r#""male""#, Sex::Male),
            (r#"" MALE ""#, Sex::Male),
            (r#""f""#, Sex::Female),
            (r#"" F ""#, Sex::Female),
            (r#""Female""#, Sex::Female),
        ] {
            assert_eq!(serde_json::from_str::<Sex>(json).unwrap(), expected, "{}", json);
        }
        assert!(serde_json::from_str::<Sex>(r#""X""#).is_err());
        assert!(serde_json::from_str::<Sex>(r#""""#).is_err());

        // Output stays the single-letter code
        assert_eq!(serde_json::to_string(&Sex::Female).unwrap(), r#""F""#);

        let contract = Contract::from_json_str(
            r#"{"entry_age": 40, "sex": "male", "interest_rate": 0.0175, "term": 20}"#,
        )
        .unwrap();
        assert_eq!(contract.sex, Sex::Male);
    }

    #[test]
    fn test_sex_lenient_fallback_is_female() {
        assert_eq!(Sex::from_code_or_female("M"), Sex::Male);
        assert_eq!(Sex::from_code_or_female("W"), Sex::Female);
        assert_eq!(Sex::from_code_or_female("unknown"), Sex::Female);
    }

    #[test]
    fn test_payment_frequency() {
        assert_eq!(PaymentFrequency::try_from(12).unwrap(), PaymentFrequency::Monthly);
        assert_eq!(PaymentFrequency::Quarterly.per_year(), 4);
        assert!(PaymentFrequency::try_from(3).is_err());
        assert_eq!(PaymentFrequency::default(), PaymentFrequency::Annual);
    }

    #[test]
    fn test_contract_json_defaults() {
        let contract = Contract::from_json_str(
            r#"{"entry_age": 40, "sex": "M", "interest_rate": 0.0175, "term": 20}"#,
        )
        .unwrap();

        assert_eq!(contract.entry_age, 40);
        assert_eq!(contract.sex, Sex::Male);
        assert_eq!(contract.premium_term(), 20);
        assert_eq!(contract.k(), 1);
        assert_eq!(contract.deferment, None);

        let monthly = Contract::from_json_str(
            r#"{"entry_age": 30, "sex": "F", "interest_rate": 0.01, "term": 30, "premium_term": 20, "frequency": 12}"#,
        )
        .unwrap();
        assert_eq!(monthly.frequency, PaymentFrequency::Monthly);
        assert_eq!(monthly.premium_term(), 20);

        assert!(Contract::from_json_str(
            r#"{"entry_age": 30, "sex": "F", "interest_rate": 0.01, "term": 30, "frequency": 3}"#,
        )
        .is_err());
    }

    #[test]
    fn test_contract_validation() {
        let table = MortalityTable::iam_2012_basic();

        assert!(Contract::new(1, 40, Sex::Male, 0.0175, 20).validate(&table).is_ok());
        assert!(Contract::new(1, 40, Sex::Male, 0.0175, 0).validate(&table).is_err());
        assert!(Contract::new(1, 40, Sex::Male, -0.01, 20).validate(&table).is_err());
        assert!(Contract::new(1, 40, Sex::Male, 0.0175, 20)
            .with_premium_term(25)
            .validate(&table)
            .is_err());

        let too_long = Contract::new(1, 110, Sex::Female, 0.0175, 20);
        assert!(matches!(
            too_long.validate(&table),
            Err(ActuarialError::OutOfRange { age: 130, .. })
        ));

        let unbounded = Contract::new(1, 40, Sex::Male, 0.0175, u32::MAX);
        assert!(matches!(
            unbounded.validate(&table),
            Err(ActuarialError::OutOfRange { age: u32::MAX, .. })
        ));
    }

    #[test]
    fn test_contract_timing() {
        let contract = Contract::new(7, 40, Sex::Male, 0.0175, 20);
        assert_eq!(contract.attained_age(0), 40);
        assert_eq!(contract.attained_age(5), 45);
        assert_eq!(contract.remaining_term(5), 15);
        assert_eq!(contract.remaining_term(25), 0);
        assert_eq!(contract.attained_age(u32::MAX), u32::MAX);
    }
}

//! Load a block of contracts from CSV

use std::io::Read;
use std::path::Path;

use csv::Reader;

use super::{Contract, PaymentFrequency, Sex};
use crate::error::{ActuarialError, Result};

/// Raw CSV row matching the contract block columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "ContractID")]
    contract_id: u32,
    #[serde(rename = "EntryAge")]
    entry_age: u32,
    #[serde(rename = "Sex")]
    sex: String,
    #[serde(rename = "InterestRate")]
    interest_rate: f64,
    #[serde(rename = "Term")]
    term: u32,
    #[serde(rename = "PremiumTerm", default)]
    premium_term: Option<u32>,
    #[serde(rename = "Frequency", default)]
    frequency: Option<u32>,
    #[serde(rename = "Deferment", default)]
    deferment: Option<u32>,
}

impl CsvRow {
    fn into_contract(self) -> Result<Contract> {
        let sex: Sex = self.sex.parse()?;
        let frequency = match self.frequency {
            Some(k) => PaymentFrequency::try_from(k)?,
            None => PaymentFrequency::Annual,
        };

        Ok(Contract {
            contract_id: self.contract_id,
            entry_age: self.entry_age,
            sex,
            interest_rate: self.interest_rate,
            term: self.term,
            premium_term: self.premium_term,
            frequency,
            deferment: self.deferment,
        })
    }
}

/// Load contracts from a CSV file
pub fn load_contracts(path: &Path) -> Result<Vec<Contract>> {
    let file = std::fs::File::open(path)?;
    let contracts = load_contracts_from_reader(file)?;
    log::info!("loaded {} contracts from {}", contracts.len(), path.display());
    Ok(contracts)
}

/// Load contracts from any reader (file, in-memory buffer)
pub fn load_contracts_from_reader<R: Read>(reader: R) -> Result<Vec<Contract>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut contracts = Vec::new();

    for (line, result) in csv_reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let contract = row.into_contract().map_err(|e| {
            ActuarialError::invalid(format!("contract row {}: {}", line + 1, e))
        })?;
        contracts.push(contract);
    }

    Ok(contracts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: &str = "\
ContractID,EntryAge,Sex,InterestRate,Term,PremiumTerm,Frequency,Deferment
1,40,M,0.0175,20,,1,
2,35,F,0.0125,30,20,12,
3,50,Male,0.02,15,15,4,5
";

    #[test]
    fn test_load_contract_block() {
        let contracts = load_contracts_from_reader(BLOCK.as_bytes()).unwrap();
        assert_eq!(contracts.len(), 3);

        assert_eq!(contracts[0].contract_id, 1);
        assert_eq!(contracts[0].sex, Sex::Male);
        assert_eq!(contracts[0].premium_term(), 20);

        assert_eq!(contracts[1].sex, Sex::Female);
        assert_eq!(contracts[1].premium_term(), 20);
        assert_eq!(contracts[1].frequency, PaymentFrequency::Monthly);

        assert_eq!(contracts[2].deferment, Some(5));
        assert_eq!(contracts[2].frequency, PaymentFrequency::Quarterly);
    }

    #[test]
    fn test_unknown_sex_rejected() {
        let block = "ContractID,EntryAge,Sex,InterestRate,Term\n1,40,X,0.0175,20\n";
        let err = load_contracts_from_reader(block.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("contract row 1"));
    }
}

use crate::domain::loan::LoanApplication;
use crate::error::{Result, UnderwritingError};
use std::io::Read;

/// Reads loan applications from a CSV source.
///
/// Expects the header `wallet,requested_loan_size,loan_use,collateral_percent,asset`.
/// Whitespace around fields is trimmed.
pub struct LoanApplicationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> LoanApplicationReader<R> {
    /// Creates a new `LoanApplicationReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes one application per row.
    pub fn applications(self) -> impl Iterator<Item = Result<LoanApplication>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(UnderwritingError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HEADER: &str = "wallet, requested_loan_size, loan_use, collateral_percent, asset";

    #[test]
    fn test_reader_valid_stream() {
        let data = format!(
            "{HEADER}\n\
             0x1111111111111111111111111111111111111111, 500, FIXED, 100, DAI\n\
             0x2222222222222222222222222222222222222222, 250.5, variable, 0, USDC"
        );
        let reader = LoanApplicationReader::new(data.as_bytes());
        let results: Vec<Result<LoanApplication>> = reader.applications().collect();

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.requested_loan_size, dec!(500));
        assert_eq!(first.loan_use, "FIXED");
        let second = results[1].as_ref().unwrap();
        assert_eq!(second.asset, "USDC");
        assert_eq!(second.requested_loan_size, dec!(250.5));
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = format!("{HEADER}\n0x11, lots, FIXED, 100, DAI");
        let reader = LoanApplicationReader::new(data.as_bytes());
        let results: Vec<Result<LoanApplication>> = reader.applications().collect();

        assert!(matches!(results[0], Err(UnderwritingError::CsvError(_))));
    }
}

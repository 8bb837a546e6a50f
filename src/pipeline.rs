use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};

use rayon::prelude::*;

use crate::crypter::Crypter;
use crate::error::CrypterError;

/// Which way the pipeline transforms records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Reads newline-delimited records, stripping surrounding whitespace from
/// each. A final fragment without a terminator still counts as a record
/// unless it trims down to nothing.
pub fn read_records(reader: impl Read) -> io::Result<Vec<String>> {
    let mut records = Vec::new();
    for line in BufReader::new(reader).lines() {
        records.push(line?.trim().to_owned());
    }
    if records.last().is_some_and(|r| r.is_empty()) {
        records.pop();
    }
    Ok(records)
}

/// Transforms every record. Records are independent, so the work runs across
/// rayon workers; collect keeps the results in input order. One record's
/// failure never aborts the rest of the batch.
pub fn process(
    crypter: &Crypter,
    direction: Direction,
    records: &[String],
) -> Vec<Result<String, CrypterError>> {
    records
        .par_iter()
        .map(|record| match direction {
            Direction::Encrypt => crypter.encrypt_record(record),
            Direction::Decrypt => crypter.decrypt_record(record),
        })
        .collect()
}

/// Writes one record per line and flushes.
pub fn write_records(writer: impl Write, records: &[String]) -> io::Result<()> {
    let mut out = BufWriter::new(writer);
    for record in records {
        writeln!(out, "{record}")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_records_trims_and_drops_trailing_blank() {
        let input = "  first line \nsecond\n\nthird\n";
        let records = read_records(input.as_bytes()).unwrap();
        assert_eq!(records, vec!["first line", "second", "", "third"]);
    }

    #[test]
    fn read_records_keeps_unterminated_tail() {
        let records = read_records("one\ntwo".as_bytes()).unwrap();
        assert_eq!(records, vec!["one", "two"]);
    }

    #[test]
    fn process_preserves_input_order() {
        let crypter = Crypter::new("mysecret").unwrap();
        let records: Vec<String> = (0..64).map(|i| format!("record number {i}")).collect();

        let crypted: Vec<String> = process(&crypter, Direction::Encrypt, &records)
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        let recovered: Vec<String> = process(&crypter, Direction::Decrypt, &crypted)
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(recovered, records);
    }

    #[test]
    fn one_bad_record_does_not_poison_the_batch() {
        let crypter = Crypter::new("mysecret").unwrap();
        let records = vec![String::from("fine"), String::new(), String::from("also fine")];

        let results = process(&crypter, Direction::Encrypt, &records);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(CrypterError::EmptyInput)));
        assert!(results[2].is_ok());
    }

    #[test]
    fn write_records_one_per_line() {
        let mut out = Vec::new();
        write_records(&mut out, &[String::from("a"), String::from("b")]).unwrap();
        assert_eq!(out, b"a\nb\n");
    }
}

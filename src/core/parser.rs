use crate::domain::model::CandidateRow;
use crate::utils::error::{LedgerError, Result};
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};

pub const REQUIRED_HEADERS: [&str; 3] = ["chicken_id", "date_recorded", "weight_kg"];

#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    chicken_id: usize,
    date_recorded: usize,
    weight_kg: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let position = |name: &str| headers.iter().position(|header| header == name);

        match (
            position("chicken_id"),
            position("date_recorded"),
            position("weight_kg"),
        ) {
            (Some(chicken_id), Some(date_recorded), Some(weight_kg)) => Ok(Self {
                chicken_id,
                date_recorded,
                weight_kg,
            }),
            _ => Err(LedgerError::InvalidHeaderError {
                expected: REQUIRED_HEADERS.join(", "),
            }),
        }
    }
}

/// Data rows of a weight upload, produced lazily in file order.
pub struct CandidateRows<'a> {
    records: StringRecordsIntoIter<&'a [u8]>,
    columns: ColumnIndex,
    last_line: usize,
}

/// Check the header line and return an iterator over the data rows.
///
/// Fields are split on commas only; quotes have no special meaning.
///
/// Lines with no content, anywhere in the file, are skipped: they produce no
/// row and do not count towards `total_rows`. They still advance the line
/// count, so `line_number` matches what an editor shows. A line holding only
/// commas is not blank and comes through as a row of empty fields.
pub fn parse_csv(text: &str) -> Result<CandidateRows<'_>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = ColumnIndex::from_headers(&headers)?;
    tracing::debug!("CSV header accepted: {:?}", headers);

    Ok(CandidateRows {
        records: reader.into_records(),
        columns,
        last_line: 1,
    })
}

impl Iterator for CandidateRows<'_> {
    type Item = Result<CandidateRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e.into())),
            };

            let line_number = record
                .position()
                .map(|position| position.line() as usize)
                .unwrap_or(self.last_line + 1);
            self.last_line = line_number;

            // whitespace-only line
            if record.len() == 1 && record.get(0).is_some_and(str::is_empty) {
                continue;
            }

            let field = |index: usize| record.get(index).unwrap_or_default().to_string();

            return Some(Ok(CandidateRow {
                chicken_id_raw: field(self.columns.chicken_id),
                date_recorded_raw: field(self.columns.date_recorded),
                weight_kg_raw: field(self.columns.weight_kg),
                line_number,
            }));
        }
    }
}

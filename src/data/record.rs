//! Raw dose-level records and delimited-text loading.

use crate::data::arm::{AdverseEvent, TreatmentArm};
use crate::error::{Result, SafetyError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Column holding the participant identifier.
pub const ID_COLUMN: &str = "id";
/// Column holding the treatment arm label.
pub const ARM_COLUMN: &str = "trx";
/// Column holding participant age.
pub const AGE_COLUMN: &str = "age";

/// One observation row: a single dose record for a participant.
///
/// Participant ids repeat across records; aggregation collapses them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Participant identifier (not unique across records).
    pub id: String,
    /// Treatment arm.
    pub arm: TreatmentArm,
    /// Age in years.
    pub age: f64,
    /// Adverse-event flags indexed by [`AdverseEvent::index`].
    pub flags: [bool; AdverseEvent::COUNT],
}

impl RawRecord {
    /// Create a record with no adverse events.
    pub fn new(id: &str, arm: TreatmentArm, age: f64) -> Self {
        Self {
            id: id.to_string(),
            arm,
            age,
            flags: [false; AdverseEvent::COUNT],
        }
    }

    /// Set one adverse-event flag.
    pub fn with_event(mut self, event: AdverseEvent) -> Self {
        self.flags[event.index()] = true;
        self
    }

    /// Whether this record flags the given event.
    pub fn has_event(&self, event: AdverseEvent) -> bool {
        self.flags[event.index()]
    }
}

/// Options for reading delimited safety data.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Load raw records from a delimited file with default options (comma separated).
pub fn load_raw_records<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
    load_raw_records_with(path, ReadOptions::default())
}

/// Load raw records from a delimited file.
pub fn load_raw_records_with<P: AsRef<Path>>(path: P, options: ReadOptions) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let records = read_raw_records(file, options)?;
    tracing::info!(
        path = %path.display(),
        records = records.len(),
        "loaded safety records"
    );
    Ok(records)
}

/// Column positions of the required fields within a header row.
struct ColumnIndex {
    id: usize,
    arm: usize,
    age: usize,
    events: [usize; AdverseEvent::COUNT],
}

impl ColumnIndex {
    fn from_header(header: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| -> Result<usize> {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| SafetyError::MissingColumn(name.to_string()))
        };

        let mut events = [0usize; AdverseEvent::COUNT];
        for event in AdverseEvent::ALL {
            events[event.index()] = find(event.column())?;
        }

        Ok(Self {
            id: find(ID_COLUMN)?,
            arm: find(ARM_COLUMN)?,
            age: find(AGE_COLUMN)?,
            events,
        })
    }
}

/// Read raw records from any reader.
///
/// Expected format:
/// - First row: header naming at least `id`, `trx`, `age` and the five event columns
/// - Extra columns are ignored; column order does not matter
/// - Event flags are numeric, any nonzero value marks the event present;
///   empty and `NA` cells count as absent
pub fn read_raw_records<R: Read>(reader: R, options: ReadOptions) -> Result<Vec<RawRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header = csv_reader.headers()?.clone();
    let columns = ColumnIndex::from_header(&header)?;

    let mut records = Vec::new();
    for (row_idx, row) in csv_reader.records().enumerate() {
        let row = row?;
        let row_number = row_idx + 1;
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let field = |col: usize| row.get(col).unwrap_or("").trim();

        let id = field(columns.id);
        if id.is_empty() {
            return Err(SafetyError::InvalidValue {
                value: String::new(),
                row: row_number,
                column: ID_COLUMN.to_string(),
            });
        }

        let arm = field(columns.arm)
            .parse::<TreatmentArm>()
            .map_err(|value| SafetyError::UnknownArm {
                value,
                row: row_number,
            })?;

        let raw_age = field(columns.age);
        let age = raw_age
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite())
            .ok_or_else(|| SafetyError::InvalidValue {
                value: raw_age.to_string(),
                row: row_number,
                column: AGE_COLUMN.to_string(),
            })?;

        let mut flags = [false; AdverseEvent::COUNT];
        for event in AdverseEvent::ALL {
            let raw = field(columns.events[event.index()]);
            flags[event.index()] = parse_flag(raw).ok_or_else(|| SafetyError::InvalidValue {
                value: raw.to_string(),
                row: row_number,
                column: event.column().to_string(),
            })?;
        }

        records.push(RawRecord {
            id: id.to_string(),
            arm,
            age,
            flags,
        });
    }

    if records.is_empty() {
        return Err(SafetyError::EmptyData("No records in safety data".to_string()));
    }

    Ok(records)
}

fn parse_flag(raw: &str) -> Option<bool> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("na") {
        return Some(false);
    }
    let value = raw.parse::<f64>().ok()?;
    Some(!value.is_nan() && value != 0.0)
}

/// Write raw records as comma-separated text with the standard header.
pub fn write_raw_records<W: Write>(records: &[RawRecord], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec![ID_COLUMN, ARM_COLUMN, AGE_COLUMN];
    header.extend(AdverseEvent::ALL.iter().map(|e| e.column()));
    csv_writer.write_record(&header)?;

    for record in records {
        let mut row = vec![
            record.id.clone(),
            record.arm.label().to_string(),
            record.age.to_string(),
        ];
        row.extend(record.flags.iter().map(|&f| if f { "1" } else { "0" }.to_string()));
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

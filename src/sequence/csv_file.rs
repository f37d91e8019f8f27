// src/sequence/csv_file.rs

//! Sequence file reader/writer.
//!
//! One header row, then one row per action in time order:
//!
//! ```text
//! date,time_utc,action,shutter_speed,aperture,iso,file,comment
//! 2024/04/08,18:18:29.3,PICT,0.001,8,100,,C2 diamond ring
//! 2024/04/08,18:18:30.0,PLAY,,,,totality.mp3,Totality
//! ```
//!
//! Columns that do not apply to a row's kind are left blank. Times carry one
//! digit of tenths, so reading a file back truncates sub-tenth precision.

use std::io::{Read, Write};
use std::str::FromStr;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::errors::{Result, SequenceError};
use crate::sequence::timefmt::{format_date, format_time, parse_date_time};
use crate::sequence::{Action, CaptureAction, PlayAction, Sequence};
use crate::types::ActionKind;

/// Column names, in file order.
pub const FIELD_NAMES: [&str; 8] = [
    "date",
    "time_utc",
    "action",
    "shutter_speed",
    "aperture",
    "iso",
    "file",
    "comment",
];

const COL_DATE: usize = 0;
const COL_TIME: usize = 1;
const COL_ACTION: usize = 2;
const COL_SHUTTER: usize = 3;
const COL_APERTURE: usize = 4;
const COL_ISO: usize = 5;
const COL_FILE: usize = 6;
const COL_COMMENT: usize = 7;

impl Sequence {
    /// Write the header row followed by every action.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(FIELD_NAMES)?;
        for action in self.actions() {
            wtr.write_record(row_for(action))?;
        }
        wtr.flush()?;
        debug!(rows = self.len(), "wrote sequence file");
        Ok(())
    }

    /// Read a sequence file. The header row is optional.
    ///
    /// Rows that cannot be turned into an action, including rows that are not
    /// valid UTF-8, are logged and dropped; only IO failures abort the read.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut actions = Vec::new();
        for (index, record) in rdr.byte_records().enumerate() {
            let record = record?;
            let row = index + 1;

            let record = match StringRecord::from_byte_record(record) {
                Ok(record) => record,
                Err(err) => {
                    warn!(row, error = %err, "dropping sequence row that is not valid UTF-8");
                    continue;
                }
            };

            if field(&record, COL_DATE) == FIELD_NAMES[COL_DATE] {
                continue;
            }

            match action_from_record(&record) {
                Ok(action) => actions.push(action),
                Err(err) => warn!(row, error = %err, "dropping sequence row"),
            }
        }

        debug!(actions = actions.len(), "read sequence file");
        Ok(Sequence::new(actions))
    }
}

fn row_for(action: &Action) -> [String; 8] {
    let time = action.time();
    let mut row: [String; 8] = Default::default();
    row[COL_DATE] = format_date(&time);
    row[COL_TIME] = format_time(&time);
    row[COL_ACTION] = action.kind().tag().to_string();

    match action {
        Action::Capture(a) => {
            row[COL_SHUTTER] = a.shutter_seconds.to_string();
            row[COL_APERTURE] = a.aperture.to_string();
            row[COL_ISO] = a.iso.to_string();
            row[COL_COMMENT] = a.comment.clone();
        }
        Action::Play(a) => {
            row[COL_FILE] = a.sound_file.clone();
            row[COL_COMMENT] = a.comment.clone();
        }
    }
    row
}

fn field(record: &StringRecord, column: usize) -> &str {
    record.get(column).unwrap_or("")
}

fn parse_field<T: FromStr>(
    record: &StringRecord,
    column: usize,
    name: &'static str,
) -> std::result::Result<T, SequenceError> {
    let value = field(record, column);
    value.trim().parse::<T>().map_err(|_| SequenceError::InvalidField {
        field: name,
        value: value.to_string(),
    })
}

fn action_from_record(record: &StringRecord) -> std::result::Result<Action, SequenceError> {
    let date = field(record, COL_DATE);
    let time = field(record, COL_TIME);
    let time = parse_date_time(date, time).ok_or_else(|| SequenceError::InvalidTimestamp {
        date: date.to_string(),
        time: time.to_string(),
    })?;

    let tag = field(record, COL_ACTION);
    let kind = ActionKind::from_str(tag).map_err(|_| SequenceError::UnknownKind(tag.to_string()))?;
    let comment = field(record, COL_COMMENT).to_string();

    let action = match kind {
        ActionKind::Capture => Action::Capture(CaptureAction {
            time,
            shutter_seconds: parse_field(record, COL_SHUTTER, "shutter_speed")?,
            aperture: parse_field(record, COL_APERTURE, "aperture")?,
            iso: parse_field(record, COL_ISO, "iso")?,
            comment,
        }),
        ActionKind::Play => Action::Play(PlayAction {
            time,
            sound_file: field(record, COL_FILE).to_string(),
            comment,
        }),
    };
    Ok(action)
}

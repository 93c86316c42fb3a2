//! CSV codec for the pipeline's wire format.
//!
//! Every object exchanged between stages is delimited tabular UTF-8:
//! comma-separated, mandatory header row, one record per `\n`-terminated
//! line. Parsing maps columns by header name, so column order in the input
//! is not significant; serialization always emits a fixed column order.

use crate::aggregate::GroupRow;
use crate::types::{CartEvent, CART_EVENT_COLUMNS};
use thiserror::Error;

/// A batch that does not satisfy the wire format.
///
/// A single bad record poisons the whole batch: the decoder returns an error
/// rather than silently dropping rows.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("row {row}: {source}")]
    Malformed { row: usize, source: csv::Error },
    #[error("row {row}: product_amount must be positive, got {amount}")]
    NonPositiveAmount { row: usize, amount: i64 },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to encode csv output")]
    Io(#[from] std::io::Error),
}

/// Decode a cart-event batch.
///
/// Requires all five cart-event columns in the header (any order). Fails on
/// the first record with a non-numeric integer column or a non-positive
/// `product_amount`. Pure; the input bytes are never mutated.
pub fn parse_cart_events(bytes: &[u8]) -> Result<Vec<CartEvent>, FormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    for column in CART_EVENT_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(FormatError::MissingColumn(column));
        }
    }

    let mut events = Vec::new();
    for (idx, record) in reader.deserialize::<CartEvent>().enumerate() {
        let event = record.map_err(|source| FormatError::Malformed {
            row: idx + 1,
            source,
        })?;
        if event.product_amount <= 0 {
            return Err(FormatError::NonPositiveAmount {
                row: idx + 1,
                amount: event.product_amount,
            });
        }
        events.push(event);
    }
    Ok(events)
}

/// Encode a cart-event batch, preserving sequence order.
///
/// The header row is always present, even for an empty batch.
pub fn write_cart_events(events: &[CartEvent]) -> Result<Vec<u8>, FormatError> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut buf);
        writer.write_record(CART_EVENT_COLUMNS)?;
        for event in events {
            writer.serialize(event)?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

/// Encode aggregated group rows under stage-supplied column names.
///
/// `columns` names the group-key columns in key order, followed by the
/// reduced-metric column.
pub fn write_group_rows(columns: &[&str], rows: &[GroupRow]) -> Result<Vec<u8>, FormatError> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut buf);
        writer.write_record(columns)?;
        for row in rows {
            let mut fields: Vec<String> = row.key.iter().map(|v| v.to_string()).collect();
            fields.push(row.total.to_string());
            writer.write_record(&fields)?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

// ============================================================================
// Tests
// ============================================================================

//! Row conversions
//!
//! Mapping between domain types and sheet rows. Reads are lenient where a
//! spreadsheet would be (numeric ids, blank optional cells) and strict where
//! money or week assignment depends on the value.

use crate::error::{PersistenceError, PersistenceResult};
use crate::sheets::{closeouts, members, verifications};
use crate::table::Row;
use chrono::{DateTime, NaiveDate};
use fitledger_core::{CloseoutRecord, Member, MemberId, VerificationEvent};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn required_text(row: &Row, sheet: &str, column: &str) -> PersistenceResult<String> {
    row.text(column)
        .ok_or_else(|| PersistenceError::missing_cell(sheet, column))
}

/// Non-negative integer cell; blank cells read as zero
fn amount(row: &Row, sheet: &str, column: &str) -> PersistenceResult<u64> {
    match row.get(column) {
        None => Ok(0),
        Some(cell) if cell.as_text().trim().is_empty() => Ok(0),
        Some(cell) => cell
            .as_integer()
            .and_then(|i| u64::try_from(i).ok())
            .ok_or_else(|| PersistenceError::invalid_cell(sheet, column, cell)),
    }
}

fn counter(row: &Row, sheet: &str, column: &str) -> PersistenceResult<u32> {
    let value = amount(row, sheet, column)?;
    u32::try_from(value).map_err(|_| PersistenceError::invalid_cell(sheet, column, value))
}

// === Members ===

impl From<&Member> for Row {
    fn from(member: &Member) -> Self {
        Row::new()
            .with(members::MEMBER_ID, member.id.as_str())
            .with(members::DISPLAY_NAME, member.display_name.as_str())
            .with(members::ACCRUED_PENALTY, member.accrued_penalty)
            .with(
                members::JOINED_AT,
                member.joined_at.format(DATE_FORMAT).to_string(),
            )
    }
}

pub fn member_from_row(row: &Row) -> PersistenceResult<Member> {
    let sheet = members::SHEET;
    let id = required_text(row, sheet, members::MEMBER_ID)?;
    let joined_at = required_text(row, sheet, members::JOINED_AT)?;
    let joined_at = NaiveDate::parse_from_str(&joined_at, DATE_FORMAT)
        .map_err(|_| PersistenceError::invalid_cell(sheet, members::JOINED_AT, &joined_at))?;

    Ok(Member {
        id: MemberId::from(id),
        display_name: row.text(members::DISPLAY_NAME).unwrap_or_default(),
        accrued_penalty: amount(row, sheet, members::ACCRUED_PENALTY)?,
        joined_at,
    })
}

// === Verifications ===

impl From<&VerificationEvent> for Row {
    fn from(event: &VerificationEvent) -> Self {
        let mut row = Row::new()
            .with(verifications::TIMESTAMP, event.timestamp.to_rfc3339())
            .with(verifications::WEEK_ID, event.week_id.as_str())
            .with(verifications::MEMBER_ID, event.member_id.as_str())
            .with(verifications::DISPLAY_NAME, event.display_name.as_str())
            .with(verifications::SESSION_INDEX, event.session_index)
            .with(verifications::PENALTY_PAID, event.penalty_paid)
            .with(verifications::NOTE, event.note.as_str());
        if let Some(url) = &event.evidence_url {
            row.set(verifications::EVIDENCE_URL, url.as_str());
        }
        row
    }
}

pub fn verification_from_row(row: &Row) -> PersistenceResult<VerificationEvent> {
    let sheet = verifications::SHEET;
    let timestamp = required_text(row, sheet, verifications::TIMESTAMP)?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map_err(|_| PersistenceError::invalid_cell(sheet, verifications::TIMESTAMP, &timestamp))?;

    Ok(VerificationEvent {
        timestamp,
        week_id: required_text(row, sheet, verifications::WEEK_ID)?,
        member_id: MemberId::from(required_text(row, sheet, verifications::MEMBER_ID)?),
        display_name: row.text(verifications::DISPLAY_NAME).unwrap_or_default(),
        session_index: counter(row, sheet, verifications::SESSION_INDEX)?,
        evidence_url: row.text(verifications::EVIDENCE_URL),
        penalty_paid: amount(row, sheet, verifications::PENALTY_PAID)?,
        note: row.text(verifications::NOTE).unwrap_or_default(),
    })
}

// === Closeouts ===

impl From<&CloseoutRecord> for Row {
    fn from(record: &CloseoutRecord) -> Self {
        Row::new()
            .with(closeouts::WEEK_ID, record.week_id.as_str())
            .with(closeouts::CLOSED_AT, record.closed_at.to_rfc3339())
            .with(closeouts::MEMBERS_CHARGED, record.members_charged)
            .with(closeouts::TOTAL_PENALTY, record.total_penalty)
    }
}

pub fn closeout_from_row(row: &Row) -> PersistenceResult<CloseoutRecord> {
    let sheet = closeouts::SHEET;
    let closed_at = required_text(row, sheet, closeouts::CLOSED_AT)?;
    let closed_at = DateTime::parse_from_rfc3339(&closed_at)
        .map_err(|_| PersistenceError::invalid_cell(sheet, closeouts::CLOSED_AT, &closed_at))?;

    Ok(CloseoutRecord {
        week_id: required_text(row, sheet, closeouts::WEEK_ID)?,
        closed_at,
        members_charged: counter(row, sheet, closeouts::MEMBERS_CHARGED)?,
        total_penalty: amount(row, sheet, closeouts::TOTAL_PENALTY)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;
    use chrono::{FixedOffset, TimeZone};
    use fitledger_core::VerificationRequest;

    #[test]
    fn test_member_row_conversion() {
        let joined = NaiveDate::from_ymd_opt(2026, 1, 25).unwrap();
        let member = Member::new(MemberId::from("1001"), "Alice", joined).with_accrued_penalty(5000);

        let row = Row::from(&member);
        assert_eq!(row.get(members::ACCRUED_PENALTY), Some(&CellValue::Integer(5000)));
        assert_eq!(row.text(members::JOINED_AT).as_deref(), Some("2026-01-25"));
        assert_eq!(member_from_row(&row).unwrap(), member);
    }

    #[test]
    fn test_member_numeric_id_reads_as_string() {
        let row = Row::new()
            .with(members::MEMBER_ID, 123456789012_i64)
            .with(members::DISPLAY_NAME, "Bob")
            .with(members::JOINED_AT, "2026-01-25");

        let member = member_from_row(&row).unwrap();
        assert_eq!(member.id, MemberId::from("123456789012"));
        assert_eq!(member.accrued_penalty, 0);
    }

    #[test]
    fn test_member_bad_cells() {
        let row = Row::new()
            .with(members::MEMBER_ID, "1")
            .with(members::JOINED_AT, "2026-01-25")
            .with(members::ACCRUED_PENALTY, -5_i64);
        assert!(matches!(
            member_from_row(&row).unwrap_err(),
            PersistenceError::InvalidCell { .. }
        ));

        let row = Row::new().with(members::JOINED_AT, "2026-01-25");
        assert!(matches!(
            member_from_row(&row).unwrap_err(),
            PersistenceError::MissingCell { .. }
        ));
    }

    #[test]
    fn test_verification_row_conversion() {
        let at = FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 1, 28, 19, 5, 0)
            .unwrap();
        let request = VerificationRequest::new(MemberId::from("1001"), "Alice", 2)
            .with_evidence_url("https://cdn.example/2.jpg");
        let event = VerificationEvent::from_request(request, at, "2026-W03".to_string());

        let row = Row::from(&event);
        assert_eq!(
            row.text(verifications::TIMESTAMP).as_deref(),
            Some("2026-01-28T19:05:00+09:00")
        );
        assert_eq!(verification_from_row(&row).unwrap(), event);
    }

    #[test]
    fn test_verification_text_index_parses() {
        let row = Row::new()
            .with(verifications::TIMESTAMP, "2026-01-28T19:05:00+09:00")
            .with(verifications::WEEK_ID, "2026-W03")
            .with(verifications::MEMBER_ID, "1001")
            .with(verifications::SESSION_INDEX, "3")
            .with(verifications::EVIDENCE_URL, "");

        let event = verification_from_row(&row).unwrap();
        assert_eq!(event.session_index, 3);
        assert_eq!(event.evidence_url, None);
        assert_eq!(event.penalty_paid, 0);
    }
}

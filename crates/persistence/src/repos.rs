//! Repositories over a `TableStore`
//!
//! Typed access to the three ledger sheets. Rows that cannot be decoded are
//! skipped with a warning: the sheet may have been edited by hand.

use crate::error::PersistenceResult;
use crate::rows::{closeout_from_row, member_from_row, verification_from_row};
use crate::sheets::{closeouts, members, verifications};
use crate::table::{Row, RowAddress, StoredRow, TableStore};
use fitledger_core::{CloseoutRecord, Member, MemberId, VerificationEvent};

fn decode_all<T>(
    sheet: &str,
    rows: Vec<StoredRow>,
    decode: impl Fn(&Row) -> PersistenceResult<T>,
) -> Vec<(RowAddress, T)> {
    rows.into_iter()
        .filter_map(|stored| match decode(&stored.cells) {
            Ok(value) => Some((stored.address, value)),
            Err(e) => {
                tracing::warn!(sheet, address = %stored.address, error = %e, "skipping unreadable row");
                None
            }
        })
        .collect()
}

fn has_member_id(row: &StoredRow, id: &MemberId) -> bool {
    row.cells.text(members::MEMBER_ID).as_deref() == Some(id.as_str())
}

// ============================================================================
// Member Repository
// ============================================================================

/// A member row and where it lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMember {
    pub address: RowAddress,
    pub member: Member,
}

pub struct MemberRepo;

impl MemberRepo {
    /// Every member row in sheet order, duplicates included
    pub async fn get_all(store: &dyn TableStore) -> PersistenceResult<Vec<StoredMember>> {
        let rows = store.scan(members::SHEET).await?;
        Ok(decode_all(members::SHEET, rows, member_from_row)
            .into_iter()
            .map(|(address, member)| StoredMember { address, member })
            .collect())
    }

    /// Whether any row carries `id`, judged by the id cell alone
    pub async fn exists(store: &dyn TableStore, id: &MemberId) -> PersistenceResult<bool> {
        let rows = store.scan(members::SHEET).await?;
        Ok(rows.iter().any(|r| has_member_id(r, id)))
    }

    /// First row whose id cell matches.
    ///
    /// An unreadable row for `id` is an error, not an absent member.
    pub async fn find(
        store: &dyn TableStore,
        id: &MemberId,
    ) -> PersistenceResult<Option<StoredMember>> {
        let rows = store.scan(members::SHEET).await?;
        let Some(stored) = rows.into_iter().find(|r| has_member_id(r, id)) else {
            return Ok(None);
        };

        let member = member_from_row(&stored.cells)?;
        Ok(Some(StoredMember {
            address: stored.address,
            member,
        }))
    }

    pub async fn insert(store: &dyn TableStore, member: &Member) -> PersistenceResult<RowAddress> {
        store.append_row(members::SHEET, Row::from(member)).await
    }

    /// Overwrite the running penalty total of one row
    pub async fn set_accrued_penalty(
        store: &dyn TableStore,
        address: RowAddress,
        total: u64,
    ) -> PersistenceResult<()> {
        store
            .update_cell(members::SHEET, address, members::ACCRUED_PENALTY, total.into())
            .await
    }
}

// ============================================================================
// Verification Repository
// ============================================================================

pub struct VerificationRepo;

impl VerificationRepo {
    pub async fn append(
        store: &dyn TableStore,
        event: &VerificationEvent,
    ) -> PersistenceResult<RowAddress> {
        store
            .append_row(verifications::SHEET, Row::from(event))
            .await
    }

    /// Every event, oldest first
    pub async fn get_all(store: &dyn TableStore) -> PersistenceResult<Vec<VerificationEvent>> {
        let rows = store.scan(verifications::SHEET).await?;
        Ok(decode_all(verifications::SHEET, rows, verification_from_row)
            .into_iter()
            .map(|(_, event)| event)
            .collect())
    }

    pub async fn get_by_week(
        store: &dyn TableStore,
        week_id: &str,
    ) -> PersistenceResult<Vec<VerificationEvent>> {
        let mut events = Self::get_all(store).await?;
        events.retain(|e| e.week_id == week_id);
        Ok(events)
    }

    pub async fn get_by_member(
        store: &dyn TableStore,
        member_id: &MemberId,
    ) -> PersistenceResult<Vec<VerificationEvent>> {
        let mut events = Self::get_all(store).await?;
        events.retain(|e| &e.member_id == member_id);
        Ok(events)
    }
}

// ============================================================================
// Closeout Repository
// ============================================================================

pub struct CloseoutRepo;

impl CloseoutRepo {
    /// Whether a marker exists for `week_id`.
    ///
    /// Only the week id cell is read, so a damaged marker row still counts.
    pub async fn exists(store: &dyn TableStore, week_id: &str) -> PersistenceResult<bool> {
        let rows = store.scan(closeouts::SHEET).await?;
        Ok(rows
            .iter()
            .any(|r| r.cells.text(closeouts::WEEK_ID).as_deref() == Some(week_id)))
    }

    pub async fn find(
        store: &dyn TableStore,
        week_id: &str,
    ) -> PersistenceResult<Option<CloseoutRecord>> {
        Ok(Self::get_all(store)
            .await?
            .into_iter()
            .find(|r| r.week_id == week_id))
    }

    pub async fn insert(
        store: &dyn TableStore,
        record: &CloseoutRecord,
    ) -> PersistenceResult<RowAddress> {
        store.append_row(closeouts::SHEET, Row::from(record)).await
    }

    pub async fn get_all(store: &dyn TableStore) -> PersistenceResult<Vec<CloseoutRecord>> {
        let rows = store.scan(closeouts::SHEET).await?;
        Ok(decode_all(closeouts::SHEET, rows, closeout_from_row)
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }
}

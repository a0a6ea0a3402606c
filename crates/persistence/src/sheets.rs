//! Sheet definitions
//!
//! Column layout of every sheet the ledger writes. Text columns hold ids,
//! names and RFC 3339 timestamps; money and counters are integers.

use crate::table::{Column, SheetSchema};

pub mod members {
    pub const SHEET: &str = "members";
    pub const MEMBER_ID: &str = "member_id";
    pub const DISPLAY_NAME: &str = "display_name";
    pub const ACCRUED_PENALTY: &str = "accrued_penalty";
    pub const JOINED_AT: &str = "joined_at";
}

pub mod verifications {
    pub const SHEET: &str = "verifications";
    pub const TIMESTAMP: &str = "timestamp";
    pub const WEEK_ID: &str = "week_id";
    pub const MEMBER_ID: &str = "member_id";
    pub const DISPLAY_NAME: &str = "display_name";
    pub const SESSION_INDEX: &str = "session_index";
    pub const EVIDENCE_URL: &str = "evidence_url";
    pub const PENALTY_PAID: &str = "penalty_paid";
    pub const NOTE: &str = "note";
}

pub mod closeouts {
    pub const SHEET: &str = "closeouts";
    pub const WEEK_ID: &str = "week_id";
    pub const CLOSED_AT: &str = "closed_at";
    pub const MEMBERS_CHARGED: &str = "members_charged";
    pub const TOTAL_PENALTY: &str = "total_penalty";
}

pub const MEMBERS: SheetSchema = SheetSchema {
    name: members::SHEET,
    columns: &[
        Column::text(members::MEMBER_ID),
        Column::text(members::DISPLAY_NAME),
        Column::integer(members::ACCRUED_PENALTY),
        Column::text(members::JOINED_AT),
    ],
};

pub const VERIFICATIONS: SheetSchema = SheetSchema {
    name: verifications::SHEET,
    columns: &[
        Column::text(verifications::TIMESTAMP),
        Column::text(verifications::WEEK_ID),
        Column::text(verifications::MEMBER_ID),
        Column::text(verifications::DISPLAY_NAME),
        Column::integer(verifications::SESSION_INDEX),
        Column::text(verifications::EVIDENCE_URL),
        Column::integer(verifications::PENALTY_PAID),
        Column::text(verifications::NOTE),
    ],
};

pub const CLOSEOUTS: SheetSchema = SheetSchema {
    name: closeouts::SHEET,
    columns: &[
        Column::text(closeouts::WEEK_ID),
        Column::text(closeouts::CLOSED_AT),
        Column::integer(closeouts::MEMBERS_CHARGED),
        Column::integer(closeouts::TOTAL_PENALTY),
    ],
};

/// Every sheet the ledger uses
pub const ALL_SHEETS: &[SheetSchema] = &[MEMBERS, VERIFICATIONS, CLOSEOUTS];

pub fn find_sheet<'a>(sheets: &'a [SheetSchema], name: &str) -> Option<&'a SheetSchema> {
    sheets.iter().find(|s| s.name == name)
}

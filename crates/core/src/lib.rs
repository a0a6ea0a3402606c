//! # Fitledger Core
//!
//! Domain types for the weekly accountability ledger:
//! members, verification events, week boundaries and penalty policy.
//!
//! Nothing in this crate touches storage or the network.

pub mod clock;
pub mod error;
pub mod member;
pub mod policy;
pub mod verification;
pub mod week;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, CoreResult};
pub use member::{Member, MemberId};
pub use policy::{CloseoutRecord, PenaltyPolicy, Shortfall, WeeklyStatus};
pub use verification::{VerificationEvent, VerificationRequest};
pub use week::{BlackoutWindow, LocalZone, WeekCalendar, WeekWindow};

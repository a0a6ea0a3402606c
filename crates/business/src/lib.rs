//! # Fitledger Business
//!
//! Business logic layer - member registry, verification ledger, penalty
//! engine and the accountability service that ties them together.

pub mod accountability;
pub mod error;
pub mod ledger;
pub mod penalty;
pub mod registry;
pub mod services;

pub use accountability::{AccountabilityService, PenaltySummary, VerificationReceipt, WeeklyOverview};
pub use error::{BusinessError, BusinessResult, ErrorKind};
pub use ledger::VerificationLedger;
pub use penalty::{CloseOutcome, PenaltyEngine};
pub use registry::MemberRegistry;
pub use services::ServiceContext;

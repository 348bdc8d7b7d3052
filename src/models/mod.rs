pub mod branches;
pub mod category;
pub mod certificates;
pub mod clubs;
pub mod counsellors;
pub mod credentials;
pub mod events;
pub mod participation;
pub mod role;
pub mod students;

pub use branches::BranchesRow;
pub use category::Category;
pub use certificates::CertificatesRow;
pub use clubs::{ClubCounterAuditRow, ClubsRow};
pub use counsellors::{CounsellorWithBranchRow, CounsellorsRow};
pub use credentials::CredentialsRow;
pub use events::{EventListingRow, EventStatus, EventsRow};
pub use participation::{ParticipationHistoryRow, ParticipationRow, ParticipationStatus};
pub use role::Role;
pub use students::{PointsBreakdownRow, StudentRefRow, StudentsRow};

pub mod models;
pub mod store;

pub use models::{Family, Invitation, InvitationStatus, Member, MemberRole};
pub use store::{FamilyStore, INVITATION_TTL_DAYS};

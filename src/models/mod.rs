pub mod audit;
mod experience;
mod user;

pub use audit::{AuditFields, Audited, DeleteMode, Visibility};
pub use experience::{DateRange, Experience, ExperienceDraft, ExperiencePatch, NewExperience};
pub use user::{NewUser, USER_ENTITY, User, UserChanges};

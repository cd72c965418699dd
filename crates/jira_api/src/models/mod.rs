mod issue;
mod user;

pub use issue::{Issue, IssueFields, SearchResults};
pub use user::UserProfile;

//! Repositories wrapping entity queries.

mod adoption_request;
mod blog;
mod notification;
mod report;
mod user;

pub use adoption_request::AdoptionRequestRepository;
pub use blog::{BlogQuery, BlogRepository};
pub use notification::NotificationRepository;
pub use report::{ReportQuery, ReportRepository};
pub use user::UserRepository;

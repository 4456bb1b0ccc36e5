//! Database entities.

#![allow(missing_docs)]

pub mod adoption_request;
pub mod blog;
pub mod notification;
pub mod report;
pub mod user;

pub use adoption_request::Entity as AdoptionRequest;
pub use blog::Entity as Blog;
pub use notification::Entity as Notification;
pub use report::Entity as Report;
pub use user::Entity as User;

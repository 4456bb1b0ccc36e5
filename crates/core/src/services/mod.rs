//! Business logic services.

#![allow(missing_docs)]

pub mod adoption;
pub mod analytics;
pub mod blog;
pub mod lifecycle;
pub mod notification;
pub mod report;
pub mod token;
pub mod triage;
pub mod user;
pub mod vet;

pub use adoption::{AdoptionDecisionInput, AdoptionRequestInput, AdoptionService, ContactInfo};
pub use analytics::{AnalyticsService, Dashboard, RescuerScore, StatBucket};
pub use blog::{BlogListQuery, BlogPage, BlogService, BlogView, CreateBlogInput, UpdateBlogInput};
pub use notification::NotificationService;
pub use report::{
    AdoptionListingInput, CreateReportInput, ReportService, ReportView, ReporterContact,
    TreatmentInput,
};
pub use token::{Claims, TokenService};
pub use triage::TriageSuggestion;
pub use user::{AuthSession, LoginInput, RegisterInput, UpdateProfileInput, UserService};
pub use vet::{NearbyVet, VetContactInput, VetService};

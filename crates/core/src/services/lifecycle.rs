//! Report lifecycle rules shared by the report, adoption and analytics services.
//!
//! The edge table itself lives on [`ReportStatus::can_transition_to`]; this
//! module holds the named transitions' source states, the role sets allowed
//! to drive them and the leaderboard weights.

use paws_common::{AppError, AppResult};
use paws_db::entities::{report::ReportStatus, user::UserRole};

/// Statuses from which a rescuer may accept a case.
pub const RESCUE_FROM: &[ReportStatus] = &[ReportStatus::Pending];

/// Statuses from which a vet may take a case.
pub const VET_CASE_FROM: &[ReportStatus] = &[ReportStatus::Pending, ReportStatus::InProgress];

/// Statuses from which a case may be listed for adoption.
pub const ADOPTION_LISTING_FROM: &[ReportStatus] =
    &[ReportStatus::InProgress, ReportStatus::UnderTreatment];

/// Statuses from which an adoption may be approved.
pub const ADOPTION_APPROVAL_FROM: &[ReportStatus] = &[ReportStatus::ReadyForAdoption];

/// Statuses the generic status change may not set. Listing and adoption
/// carry side effects only their own operations perform.
pub const DEDICATED_TARGETS: &[ReportStatus] =
    &[ReportStatus::ReadyForAdoption, ReportStatus::Adopted];

/// Roles that may file a report. Anonymous filing is also allowed.
pub const REPORTER_ROLES: &[UserRole] = &[UserRole::Public, UserRole::Rescuer, UserRole::Admin];

/// Roles that may accept a rescue.
pub const RESCUER_ROLES: &[UserRole] = &[UserRole::Rescuer, UserRole::Admin];

/// Roles that may take vet cases and upload recovery photos.
pub const VET_ROLES: &[UserRole] = &[UserRole::Vet, UserRole::Admin];

/// Roles that may apply to adopt.
pub const ADOPTER_ROLES: &[UserRole] = &[UserRole::Public, UserRole::Rescuer, UserRole::Admin];

/// Roles that may review adoption requests.
pub const ADOPTION_MANAGER_ROLES: &[UserRole] =
    &[UserRole::Admin, UserRole::Rescuer, UserRole::Vet];

/// Leaderboard weight of a report assigned to a rescuer.
#[must_use]
pub const fn leaderboard_points(status: ReportStatus) -> u32 {
    match status {
        ReportStatus::Pending => 0,
        ReportStatus::InProgress => 5,
        ReportStatus::UnderTreatment => 10,
        ReportStatus::ReadyForAdoption => 15,
        ReportStatus::Adopted => 20,
    }
}

/// Reject unless `current` is one of `from`.
pub fn ensure_status(current: ReportStatus, from: &[ReportStatus], action: &str) -> AppResult<()> {
    if from.contains(&current) {
        Ok(())
    } else {
        Err(invalid_transition(current, action))
    }
}

/// Reject unless the edge `from -> to` exists.
pub fn ensure_edge(from: ReportStatus, to: ReportStatus) -> AppResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppError::InvalidTransition(format!(
            "Cannot move report from {} to {}",
            from.as_str(),
            to.as_str()
        )))
    }
}

/// Reject targets that have a dedicated operation.
pub fn ensure_generic_target(to: ReportStatus) -> AppResult<()> {
    if !DEDICATED_TARGETS.contains(&to) {
        return Ok(());
    }
    let hint = if to == ReportStatus::Adopted {
        "approve an adoption request instead"
    } else {
        "use post-for-adoption instead"
    };
    Err(AppError::InvalidTransition(format!(
        "Cannot set a report to {} directly; {hint}",
        to.as_str()
    )))
}

/// The error for a transition whose compare-and-swap lost, or whose source
/// state is wrong.
#[must_use]
pub fn invalid_transition(current: ReportStatus, action: &str) -> AppError {
    AppError::InvalidTransition(format!(
        "Cannot {action} a report that is {}",
        current.as_str()
    ))
}

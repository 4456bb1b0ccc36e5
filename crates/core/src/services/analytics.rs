//! Read-only dashboard aggregation over all reports.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use paws_common::AppResult;
use paws_db::{
    entities::{
        report::{self, ReportStatus},
        user::{self, UserRole},
    },
    repositories::{ReportRepository, UserRepository},
};
use serde::Serialize;

use super::lifecycle::leaderboard_points;

/// One grouped count. Serialized as `{"_id": key, "count": n}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatBucket {
    #[serde(rename = "_id")]
    pub key: String,
    pub count: u64,
}

/// A leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RescuerScore {
    pub id: String,
    pub name: String,
    pub rescue_count: i32,
    pub points: i32,
    pub score: u32,
}

/// The admin dashboard.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_reports: u64,
    pub pending_reports: u64,
    pub adopted_reports: u64,
    pub ready_for_adoption: u64,
    pub status_stats: Vec<StatBucket>,
    pub issue_type_stats: Vec<StatBucket>,
    pub monthly_stats: Vec<StatBucket>,
    pub top_rescuers: Vec<RescuerScore>,
}

/// Analytics service.
#[derive(Clone)]
pub struct AnalyticsService {
    report_repo: ReportRepository,
    user_repo: UserRepository,
    leaderboard_size: usize,
}

impl AnalyticsService {
    /// Create a new analytics service.
    #[must_use]
    pub const fn new(
        report_repo: ReportRepository,
        user_repo: UserRepository,
        leaderboard_size: usize,
    ) -> Self {
        Self {
            report_repo,
            user_repo,
            leaderboard_size,
        }
    }

    /// Build the dashboard. Admin only.
    pub async fn dashboard(&self, user: &user::Model) -> AppResult<Dashboard> {
        user.require_role(&[UserRole::Admin])?;

        let reports = self.report_repo.find_all().await?;
        let scores = rescuer_scores(&reports);
        let ids: Vec<String> = scores.keys().cloned().collect();
        let rescuers = self.user_repo.find_by_ids(&ids).await?;

        Ok(summarize(&reports, &rescuers, self.leaderboard_size))
    }
}

/// Leaderboard score per assigned rescuer. Rescuers with no scoring reports
/// are omitted.
#[must_use]
pub fn rescuer_scores(reports: &[report::Model]) -> HashMap<String, u32> {
    let mut scores: HashMap<String, u32> = HashMap::new();
    for report in reports {
        let Some(rescuer) = &report.assigned_to else {
            continue;
        };
        let points = leaderboard_points(report.status);
        if points > 0 {
            *scores.entry(rescuer.clone()).or_default() += points;
        }
    }
    scores
}

/// Aggregate `reports` into a dashboard. `rescuers` supplies names and
/// counters for the leaderboard; scored ids missing from it are dropped.
#[must_use]
pub fn summarize(
    reports: &[report::Model],
    rescuers: &[user::Model],
    leaderboard_size: usize,
) -> Dashboard {
    let count = |status: ReportStatus| -> u64 {
        reports.iter().filter(|r| r.status == status).count() as u64
    };

    let status_stats = ReportStatus::ALL
        .into_iter()
        .map(|status| StatBucket {
            key: status.as_str().to_string(),
            count: count(status),
        })
        .filter(|bucket| bucket.count > 0)
        .collect();

    let mut by_issue: BTreeMap<&'static str, u64> = BTreeMap::new();
    let mut by_month: BTreeMap<String, u64> = BTreeMap::new();
    for report in reports {
        *by_issue.entry(report.issue_type.as_str()).or_default() += 1;
        let month = report.created_at.with_timezone(&Utc).format("%Y-%m").to_string();
        *by_month.entry(month).or_default() += 1;
    }

    let scores = rescuer_scores(reports);
    let mut top_rescuers: Vec<RescuerScore> = rescuers
        .iter()
        .filter_map(|u| {
            scores.get(&u.id).map(|&score| RescuerScore {
                id: u.id.clone(),
                name: u.name.clone(),
                rescue_count: u.rescue_count,
                points: u.points,
                score,
            })
        })
        .collect();
    top_rescuers.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.rescue_count.cmp(&a.rescue_count))
            .then_with(|| a.id.cmp(&b.id))
    });
    top_rescuers.truncate(leaderboard_size);

    Dashboard {
        total_reports: reports.len() as u64,
        pending_reports: count(ReportStatus::Pending),
        adopted_reports: count(ReportStatus::Adopted),
        ready_for_adoption: count(ReportStatus::ReadyForAdoption),
        status_stats,
        issue_type_stats: into_buckets(by_issue),
        monthly_stats: into_buckets(by_month),
        top_rescuers,
    }
}

fn into_buckets<K: ToString>(map: BTreeMap<K, u64>) -> Vec<StatBucket> {
    map.into_iter()
        .map(|(key, count)| StatBucket {
            key: key.to_string(),
            count,
        })
        .collect()
}

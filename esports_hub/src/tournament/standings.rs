//! Standings calculation.

use super::models::{Registration, StandingRow};
use std::cmp::Ordering;

/// Order in which registrations are ranked: more points first, then earlier
/// registration, then lower id.
pub fn ranking_order(a: &Registration, b: &Registration) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort registrations into ranking order
pub fn sort_registrations(registrations: &mut [Registration]) {
    registrations.sort_by(ranking_order);
}

/// Rank registrations. Ranks are 1-based and strictly sequential; ties in
/// points are broken by registration time, never shared.
pub fn compute_standings(mut registrations: Vec<Registration>) -> Vec<StandingRow> {
    sort_registrations(&mut registrations);

    registrations
        .into_iter()
        .enumerate()
        .map(|(index, r)| StandingRow {
            rank: index + 1,
            user_id: r.user_id,
            team_name: r.team_name,
            points: r.points,
            status: r.status,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::models::RegistrationStatus;
    use chrono::{Duration, TimeZone, Utc};

    fn registration(id: i64, points: i64, minutes: i64) -> Registration {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        Registration {
            id,
            tournament_id: 1,
            user_id: id * 10,
            team_name: format!("Team {id}"),
            status: RegistrationStatus::Registered,
            points,
            created_at: base + Duration::minutes(minutes),
        }
    }

    #[test]
    fn test_points_rank_first() {
        let rows = compute_standings(vec![
            registration(1, 0, 0),
            registration(2, 6, 5),
            registration(3, 3, 1),
        ]);

        let order: Vec<i64> = rows.iter().map(|r| r.points).collect();
        assert_eq!(order, vec![6, 3, 0]);
        assert_eq!(rows[0].user_id, 20);
        assert_eq!(rows.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_ties_broken_by_registration_time_then_id() {
        let rows = compute_standings(vec![
            registration(3, 3, 2),
            registration(2, 3, 1),
            registration(1, 3, 2),
        ]);

        let ids: Vec<i64> = rows.iter().map(|r| r.user_id / 10).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_empty_standings() {
        assert!(compute_standings(Vec::new()).is_empty());
    }
}

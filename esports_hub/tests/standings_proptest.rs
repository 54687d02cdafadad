/// Property-based tests for standings ranking using proptest
///
/// Whatever the points and registration times, ranks are 1..=n in order and
/// every adjacent pair respects points desc, then created_at asc, then id asc.
use chrono::{Duration, TimeZone, Utc};
use esports_hub::tournament::{
    Registration, RegistrationStatus, compute_standings, sort_registrations,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

// Registrations with unique ids, small point totals and clustered timestamps
// so that ties on both points and time are common.
fn registrations_strategy() -> impl Strategy<Value = Vec<Registration>> {
    prop::collection::vec((0i64..5, 0i64..4), 0..40).prop_map(|rows| {
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap();
        rows.into_iter()
            .enumerate()
            .map(|(i, (wins, minute))| Registration {
                id: (i as i64 + 1) * 7 % 101,
                tournament_id: 1,
                user_id: 1000 + i as i64,
                team_name: format!("Team {i}"),
                status: RegistrationStatus::Registered,
                points: wins * 3,
                created_at: base + Duration::minutes(minute),
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn test_ranks_are_sequential(registrations in registrations_strategy()) {
        let n = registrations.len();
        let rows = compute_standings(registrations);

        prop_assert_eq!(rows.len(), n);
        for (i, row) in rows.iter().enumerate() {
            prop_assert_eq!(row.rank, i + 1);
        }
    }

    #[test]
    fn test_adjacent_rows_respect_ordering(registrations in registrations_strategy()) {
        let mut sorted = registrations.clone();
        sort_registrations(&mut sorted);

        for pair in sorted.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(a.points >= b.points);
            if a.points == b.points {
                prop_assert!(a.created_at <= b.created_at);
                if a.created_at == b.created_at {
                    prop_assert!(a.id < b.id);
                }
            }
        }

        let rows = compute_standings(registrations);
        let users: Vec<i64> = rows.iter().map(|r| r.user_id).collect();
        let expected: Vec<i64> = sorted.iter().map(|r| r.user_id).collect();
        prop_assert_eq!(users, expected);
    }

    #[test]
    fn test_standings_are_a_permutation(registrations in registrations_strategy()) {
        let before: BTreeSet<i64> = registrations.iter().map(|r| r.user_id).collect();
        let after: BTreeSet<i64> = compute_standings(registrations)
            .iter()
            .map(|r| r.user_id)
            .collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn test_input_order_does_not_matter(registrations in registrations_strategy()) {
        let mut reversed = registrations.clone();
        reversed.reverse();
        prop_assert_eq!(compute_standings(registrations), compute_standings(reversed));
    }
}

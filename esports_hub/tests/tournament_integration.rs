//! Integration tests for the tournament lifecycle
//!
//! These tests drive the public `TournamentManager` API against the in-memory
//! store: creation, joining, capacity, results and standings.

use esports_hub::auth::{Caller, Role};
use esports_hub::db::MemoryStore;
use esports_hub::tournament::{
    AnnouncementDraft, ErrorKind, MatchDraft, MatchResult, MatchStatus, TournamentDraft, TournamentError,
    TournamentManager, TournamentStatus, WIN_POINTS,
};
use std::sync::Arc;

const ADMIN: Caller = Caller {
    user_id: 1,
    role: Role::Admin,
};

fn user(id: i64) -> Caller {
    Caller::new(id, Role::User)
}

fn manager() -> TournamentManager {
    TournamentManager::new(Arc::new(MemoryStore::new()))
}

async fn create_cup(manager: &TournamentManager, max_teams: i64) -> i64 {
    manager
        .create_tournament(
            &ADMIN,
            TournamentDraft::new("Night Cup", "Counter-Strike 2").with_max_teams(max_teams),
        )
        .await
        .expect("Failed to create tournament")
        .tournament
        .id
}

#[tokio::test]
async fn test_created_tournament_reads_back_with_zero_counts() {
    let manager = manager();
    let created = manager
        .create_tournament(&ADMIN, TournamentDraft::new("Night Cup", "Counter-Strike 2"))
        .await
        .unwrap();

    let fetched = manager
        .get_tournament(created.tournament.id, None)
        .await
        .unwrap();
    assert_eq!(fetched.tournament, created.tournament);
    assert_eq!(fetched.participants_count, 0);
    assert_eq!(fetched.matches_count, 0);
    assert!(!fetched.is_registered);
    assert_eq!(fetched.tournament.status, TournamentStatus::RegistrationOpen);
    assert_eq!(fetched.tournament.created_by_user_id, Some(ADMIN.user_id));
}

#[tokio::test]
async fn test_join_then_summary_counts_and_flags() {
    let manager = manager();
    let id = create_cup(&manager, 4).await;

    let registration = manager.join(id, &user(10), Some("Nova Squad")).await.unwrap();
    assert_eq!(registration.points, 0);
    assert_eq!(registration.team_name, "Nova Squad");

    let as_member = manager.get_tournament(id, Some(&user(10))).await.unwrap();
    assert_eq!(as_member.participants_count, 1);
    assert!(as_member.is_registered);

    let as_other = manager.get_tournament(id, Some(&user(11))).await.unwrap();
    assert!(!as_other.is_registered);
}

#[tokio::test]
async fn test_join_check_order() {
    let manager = manager();
    let id = create_cup(&manager, 1).await;

    // Role is checked before the tournament exists
    let err = manager.join(999, &ADMIN, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = manager.join(999, &user(10), None).await.unwrap_err();
    assert!(matches!(err, TournamentError::NotFound("Tournament")));

    manager.join(id, &user(10), None).await.unwrap();

    // Already registered wins over full
    let err = manager.join(id, &user(10), None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Duplicate);

    let err = manager.join(id, &user(11), None).await.unwrap_err();
    assert!(matches!(err, TournamentError::TournamentFull { capacity: 1 }));

    manager
        .update_status(&ADMIN, id, TournamentStatus::Completed)
        .await
        .unwrap();
    let err = manager.join(id, &user(11), None).await.unwrap_err();
    assert!(matches!(
        err,
        TournamentError::InvalidState(TournamentStatus::Completed)
    ));
}

#[tokio::test]
async fn test_rejected_join_leaves_no_registration() {
    let manager = manager();
    let id = create_cup(&manager, 2).await;

    let err = manager.join(id, &user(10), Some("X")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(manager.participants(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_live_and_upcoming_tournaments_still_accept_joins() {
    let manager = manager();
    let id = create_cup(&manager, 4).await;

    manager
        .update_status(&ADMIN, id, TournamentStatus::Live)
        .await
        .unwrap();
    manager.join(id, &user(10), None).await.unwrap();

    manager
        .update_status(&ADMIN, id, TournamentStatus::Upcoming)
        .await
        .unwrap();
    manager.join(id, &user(11), None).await.unwrap();
}

#[tokio::test]
async fn test_default_team_name_is_placeholder_without_profile() {
    let manager = manager();
    let id = create_cup(&manager, 4).await;

    let registration = manager.join(id, &user(42), Some("   ")).await.unwrap();
    assert_eq!(registration.team_name, "Team-42");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_never_exceed_capacity() {
    let manager = manager();
    let id = create_cup(&manager, 3).await;
    manager.join(id, &user(10), None).await.unwrap();
    manager.join(id, &user(11), None).await.unwrap();

    let handles: Vec<_> = [20, 21]
        .into_iter()
        .map(|uid| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.join(id, &user(uid), None).await })
        })
        .collect();

    let mut successes = 0;
    let mut full = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) if e.kind() == ErrorKind::CapacityExceeded => full += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(full, 1);
    assert_eq!(manager.participants(id).await.unwrap().len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_joins_register_once() {
    let manager = manager();
    let id = create_cup(&manager, 8).await;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.join(id, &user(10), None).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert_eq!(e.kind(), ErrorKind::Duplicate),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(manager.participants(id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_result_awards_points_to_winner_registration() {
    let manager = manager();
    let id = create_cup(&manager, 4).await;
    manager.join(id, &user(10), Some("Nova Squad")).await.unwrap();
    manager.join(id, &user(11), Some("Iron Hawks")).await.unwrap();

    let m = manager
        .create_match(&ADMIN, id, MatchDraft::new("Nova Squad", "Iron Hawks"))
        .await
        .unwrap();
    assert_eq!(m.status, MatchStatus::Scheduled);

    let updated = manager
        .record_result(id, m.id, &ADMIN, &MatchResult::new(1, 3))
        .await
        .unwrap();
    assert_eq!(updated.winner.as_deref(), Some("Iron Hawks"));
    assert_eq!(updated.status, MatchStatus::Finished);
    assert_eq!(updated.team_a_score, Some(1));
    assert_eq!(updated.team_b_score, Some(3));

    let standings = manager.standings(id).await.unwrap();
    assert_eq!(standings[0].team_name, "Iron Hawks");
    assert_eq!(standings[0].points, WIN_POINTS);
    assert_eq!(standings[0].rank, 1);
    assert_eq!(standings[1].points, 0);
}

#[tokio::test]
async fn test_tie_sets_no_winner_and_awards_nothing() {
    let manager = manager();
    let id = create_cup(&manager, 4).await;
    manager.join(id, &user(10), Some("Nova Squad")).await.unwrap();

    let m = manager
        .create_match(&ADMIN, id, MatchDraft::new("Nova Squad", "Iron Hawks"))
        .await
        .unwrap();
    let updated = manager
        .record_result(id, m.id, &ADMIN, &MatchResult::new(2, 2))
        .await
        .unwrap();

    assert_eq!(updated.winner, None);
    assert_eq!(updated.status, MatchStatus::Finished);
    assert!(manager.standings(id).await.unwrap().iter().all(|r| r.points == 0));
}

#[tokio::test]
async fn test_resubmitted_result_awards_again() {
    let manager = manager();
    let id = create_cup(&manager, 4).await;
    manager.join(id, &user(10), Some("Nova Squad")).await.unwrap();

    let m = manager
        .create_match(&ADMIN, id, MatchDraft::new("Nova Squad", "Iron Hawks"))
        .await
        .unwrap();
    for _ in 0..2 {
        manager
            .record_result(id, m.id, &ADMIN, &MatchResult::new(5, 0))
            .await
            .unwrap();
    }

    let standings = manager.standings(id).await.unwrap();
    assert_eq!(standings[0].points, 2 * WIN_POINTS);
}

#[tokio::test]
async fn test_unknown_explicit_winner_is_stored_without_points() {
    let manager = manager();
    let id = create_cup(&manager, 4).await;
    manager.join(id, &user(10), Some("Nova Squad")).await.unwrap();

    let m = manager
        .create_match(&ADMIN, id, MatchDraft::new("Nova Squad", "Iron Hawks"))
        .await
        .unwrap();
    let updated = manager
        .record_result(
            id,
            m.id,
            &ADMIN,
            &MatchResult::new(3, 0).with_winner("Ghost Team"),
        )
        .await
        .unwrap();

    assert_eq!(updated.winner.as_deref(), Some("Ghost Team"));
    assert!(manager.standings(id).await.unwrap().iter().all(|r| r.points == 0));
}

#[tokio::test]
async fn test_record_result_check_order() {
    let manager = manager();
    let id = create_cup(&manager, 4).await;
    let other = create_cup(&manager, 4).await;
    let m = manager
        .create_match(&ADMIN, id, MatchDraft::new("Nova Squad", "Iron Hawks"))
        .await
        .unwrap();

    let err = manager
        .record_result(id, m.id, &user(10), &MatchResult::new(1, 0))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = manager
        .record_result(999, m.id, &ADMIN, &MatchResult::new(-1, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::NotFound("Tournament")));

    // Match belongs to a different tournament
    let err = manager
        .record_result(other, m.id, &ADMIN, &MatchResult::new(-1, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::NotFound("Match")));

    let err = manager
        .record_result(id, m.id, &ADMIN, &MatchResult::new(-1, 0))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    // Rejected submissions leave the match untouched
    let matches = manager.list_matches(id).await.unwrap();
    assert_eq!(matches[0].status, MatchStatus::Scheduled);
    assert_eq!(matches[0].team_a_score, None);
}

#[tokio::test]
async fn test_points_go_to_earliest_matching_team_name() {
    let manager = manager();
    let id = create_cup(&manager, 4).await;
    let first = manager.join(id, &user(10), Some("Nova Squad")).await.unwrap();
    manager.join(id, &user(11), Some("Nova Squad")).await.unwrap();

    let m = manager
        .create_match(&ADMIN, id, MatchDraft::new("Nova Squad", "Iron Hawks"))
        .await
        .unwrap();
    manager
        .record_result(id, m.id, &ADMIN, &MatchResult::new(2, 1))
        .await
        .unwrap();

    let standings = manager.standings(id).await.unwrap();
    assert_eq!(standings[0].user_id, first.user_id);
    assert_eq!(standings[0].points, WIN_POINTS);
    assert_eq!(standings[1].points, 0);
}

#[tokio::test]
async fn test_matches_and_announcements_ordering() {
    let manager = manager();
    let id = create_cup(&manager, 4).await;

    for (round, a, b) in [
        ("Semifinals", "Nova Squad", "Pixel Storm"),
        ("Quarterfinals", "Nova Squad", "Iron Hawks"),
        ("Quarterfinals", "Pixel Storm", "Zenith Five"),
    ] {
        manager
            .create_match(&ADMIN, id, MatchDraft::new(a, b).in_round(round))
            .await
            .unwrap();
    }
    let rounds: Vec<(String, String)> = manager
        .list_matches(id)
        .await
        .unwrap()
        .into_iter()
        .map(|m| (m.round_name, m.team_a))
        .collect();
    assert_eq!(
        rounds,
        vec![
            ("Quarterfinals".to_string(), "Nova Squad".to_string()),
            ("Quarterfinals".to_string(), "Pixel Storm".to_string()),
            ("Semifinals".to_string(), "Nova Squad".to_string()),
        ]
    );

    manager
        .create_announcement(&ADMIN, id, AnnouncementDraft::new("Check-in", "Opens at noon"))
        .await
        .unwrap();
    manager
        .create_announcement(&ADMIN, id, AnnouncementDraft::new("Delay", "Start moved by 15 minutes"))
        .await
        .unwrap();
    let titles: Vec<String> = manager
        .list_announcements(id)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.title)
        .collect();
    assert_eq!(titles, vec!["Delay".to_string(), "Check-in".to_string()]);
}

#[tokio::test]
async fn test_my_registrations_newest_first() {
    let manager = manager();
    let first = create_cup(&manager, 4).await;
    let second = create_cup(&manager, 4).await;

    manager.join(first, &user(10), Some("Nova Squad")).await.unwrap();
    manager.join(second, &user(10), Some("Nova Squad")).await.unwrap();
    manager.join(second, &user(11), Some("Iron Hawks")).await.unwrap();

    let mine = manager.my_registrations(&user(10)).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].tournament_id, second);
    assert_eq!(mine[1].tournament_id, first);
    assert_eq!(mine[0].tournament_name, "Night Cup");
}

#[tokio::test]
async fn test_admin_only_operations() {
    let manager = manager();
    let id = create_cup(&manager, 4).await;

    let err = manager
        .create_match(&user(10), id, MatchDraft::new("Nova Squad", "Iron Hawks"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = manager
        .update_status(&user(10), id, TournamentStatus::Live)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = manager
        .create_announcement(
            &user(10),
            id,
            AnnouncementDraft::new("Hi", "there"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_unknown_tournament_reads_are_not_found() {
    let manager = manager();
    assert!(matches!(
        manager.standings(404).await,
        Err(TournamentError::NotFound(_))
    ));
    assert!(matches!(
        manager.participants(404).await,
        Err(TournamentError::NotFound(_))
    ));
    assert!(matches!(
        manager.list_matches(404).await,
        Err(TournamentError::NotFound(_))
    ));
    assert!(matches!(
        manager.list_announcements(404).await,
        Err(TournamentError::NotFound(_))
    ));
}

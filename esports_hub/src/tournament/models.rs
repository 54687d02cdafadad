//! Tournament data models.

use super::errors::{TournamentError, TournamentResult};
use crate::auth::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tournament ID type
pub type TournamentId = i64;

/// Registration ID type
pub type RegistrationId = i64;

/// Match ID type
pub type MatchId = i64;

/// Announcement ID type
pub type AnnouncementId = i64;

/// Points awarded to the registration whose team wins a match
pub const WIN_POINTS: i64 = 3;

/// Capacity used when a tournament is created without one
pub const DEFAULT_MAX_TEAMS: i64 = 16;

/// Format used when a tournament is created without one
pub const DEFAULT_FORMAT: &str = "Single Elimination";

/// Round label used when a match is created without one
pub const DEFAULT_ROUND_NAME: &str = "Round 1";

/// Tournament lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Accepting registrations
    #[default]
    RegistrationOpen,
    /// Announced, not yet started
    Upcoming,
    /// Matches in progress
    Live,
    /// Finished; no new registrations
    Completed,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::RegistrationOpen => "registration_open",
            TournamentStatus::Upcoming => "upcoming",
            TournamentStatus::Live => "live",
            TournamentStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TournamentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registration_open" => Ok(TournamentStatus::RegistrationOpen),
            "upcoming" => Ok(TournamentStatus::Upcoming),
            "live" => Ok(TournamentStatus::Live),
            "completed" => Ok(TournamentStatus::Completed),
            other => Err(format!("unknown tournament status: {other}")),
        }
    }
}

/// Registration status
///
/// Joining is the only operation that creates registrations, so `Registered`
/// is the only status stored today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    #[default]
    Registered,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Registered => "registered",
        }
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registered" => Ok(RegistrationStatus::Registered),
            other => Err(format!("unknown registration status: {other}")),
        }
    }
}

/// Match status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Finished,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Finished => "finished",
        }
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "finished" => Ok(MatchStatus::Finished),
            other => Err(format!("unknown match status: {other}")),
        }
    }
}

/// Tournament aggregate root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub game: String,
    pub format: String,
    pub status: TournamentStatus,
    pub location: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub prize_pool: i64,
    /// Capacity: maximum number of registrations
    pub max_teams: i64,
    pub created_by_user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Tournament creation input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentDraft {
    pub name: String,
    pub game: String,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub status: TournamentStatus,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub prize_pool: i64,
    #[serde(default = "default_max_teams")]
    pub max_teams: i64,
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

fn default_max_teams() -> i64 {
    DEFAULT_MAX_TEAMS
}

impl TournamentDraft {
    /// Draft with every optional field at its default
    pub fn new(name: impl Into<String>, game: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            game: game.into(),
            format: default_format(),
            status: TournamentStatus::default(),
            location: None,
            description: None,
            start_date: None,
            end_date: None,
            prize_pool: 0,
            max_teams: DEFAULT_MAX_TEAMS,
        }
    }

    pub fn with_max_teams(mut self, max_teams: i64) -> Self {
        self.max_teams = max_teams;
        self
    }

    pub fn with_status(mut self, status: TournamentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_schedule(
        mut self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    /// Check field limits and the date window
    pub fn validate(&self) -> TournamentResult<()> {
        check_length("name", &self.name, 2, 255)?;
        check_length("game", &self.game, 2, 100)?;
        check_length("format", &self.format, 2, 100)?;
        if let Some(location) = &self.location {
            check_length("location", location, 0, 255)?;
        }

        if self.prize_pool < 0 {
            return Err(TournamentError::Validation(
                "prize_pool cannot be negative".to_string(),
            ));
        }
        if self.max_teams < 1 {
            return Err(TournamentError::Validation(
                "max_teams must be at least 1".to_string(),
            ));
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && end < start
        {
            return Err(TournamentError::Validation(
                "End date cannot be before start date".to_string(),
            ));
        }

        Ok(())
    }
}

/// Tournament with derived counters for the listing and detail views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentSummary {
    #[serde(flatten)]
    pub tournament: Tournament,
    pub participants_count: i64,
    pub matches_count: i64,
    /// Whether the calling user holds a registration; false for anonymous calls
    pub is_registered: bool,
}

/// A participant's enrollment in a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub tournament_id: TournamentId,
    pub user_id: UserId,
    pub team_name: String,
    pub status: RegistrationStatus,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

/// Registration to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub tournament_id: TournamentId,
    pub user_id: UserId,
    pub team_name: String,
    pub status: RegistrationStatus,
    pub points: i64,
}

/// Registration joined with its tournament, as listed for the owning user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MyRegistration {
    pub registration_id: RegistrationId,
    pub tournament_id: TournamentId,
    pub tournament_name: String,
    pub game: String,
    pub status: RegistrationStatus,
    pub team_name: String,
    pub points: i64,
    pub start_date: Option<DateTime<Utc>>,
}

impl MyRegistration {
    pub fn new(registration: Registration, tournament: &Tournament) -> Self {
        Self {
            registration_id: registration.id,
            tournament_id: tournament.id,
            tournament_name: tournament.name.clone(),
            game: tournament.game.clone(),
            status: registration.status,
            team_name: registration.team_name,
            points: registration.points,
            start_date: tournament.start_date,
        }
    }
}

/// Scheduled or finished match between two named teams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub round_name: String,
    pub team_a: String,
    pub team_b: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub team_a_score: Option<i64>,
    pub team_b_score: Option<i64>,
    pub winner: Option<String>,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
}

/// Match creation input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDraft {
    #[serde(default = "default_round_name")]
    pub round_name: String,
    pub team_a: String,
    pub team_b: String,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

fn default_round_name() -> String {
    DEFAULT_ROUND_NAME.to_string()
}

impl MatchDraft {
    pub fn new(team_a: impl Into<String>, team_b: impl Into<String>) -> Self {
        Self {
            round_name: default_round_name(),
            team_a: team_a.into(),
            team_b: team_b.into(),
            scheduled_at: None,
        }
    }

    pub fn in_round(mut self, round_name: impl Into<String>) -> Self {
        self.round_name = round_name.into();
        self
    }

    pub fn validate(&self) -> TournamentResult<()> {
        check_length("round_name", &self.round_name, 2, 100)?;
        check_length("team_a", &self.team_a, 2, 255)?;
        check_length("team_b", &self.team_b, 2, 255)?;
        Ok(())
    }
}

/// Result submission for a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub team_a_score: i64,
    pub team_b_score: i64,
    #[serde(default)]
    pub winner: Option<String>,
}

impl MatchResult {
    pub fn new(team_a_score: i64, team_b_score: i64) -> Self {
        Self {
            team_a_score,
            team_b_score,
            winner: None,
        }
    }

    pub fn with_winner(mut self, winner: impl Into<String>) -> Self {
        self.winner = Some(winner.into());
        self
    }

    pub fn validate(&self) -> TournamentResult<()> {
        if self.team_a_score < 0 || self.team_b_score < 0 {
            return Err(TournamentError::Validation(
                "Scores cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Winner for `m` under this result.
    ///
    /// An explicit, non-empty winner is taken verbatim, even when it names
    /// neither team or is only whitespace. Otherwise the strictly higher
    /// score wins and a tie has no winner.
    pub fn resolve_winner(&self, m: &Match) -> Option<String> {
        if let Some(winner) = self.winner.as_deref()
            && !winner.is_empty()
        {
            return Some(winner.to_string());
        }

        match self.team_a_score.cmp(&self.team_b_score) {
            std::cmp::Ordering::Greater => Some(m.team_a.clone()),
            std::cmp::Ordering::Less => Some(m.team_b.clone()),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Informational post attached to a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub tournament_id: TournamentId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Announcement creation input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementDraft {
    pub title: String,
    pub content: String,
}

impl AnnouncementDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn validate(&self) -> TournamentResult<()> {
        check_length("title", &self.title, 2, 255)?;
        check_length("content", &self.content, 2, usize::MAX)?;
        Ok(())
    }
}

/// One ranked line of a tournament's standings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingRow {
    /// 1-based, strictly sequential
    pub rank: usize,
    pub user_id: UserId,
    pub team_name: String,
    pub points: i64,
    pub status: RegistrationStatus,
}

/// Character-count bounds on a required text field; blank counts as empty.
pub(crate) fn check_length(
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) -> TournamentResult<()> {
    let len = value.chars().count();
    if value.trim().is_empty() && min > 0 {
        return Err(TournamentError::Validation(format!(
            "{field} cannot be empty"
        )));
    }
    if len < min || len > max {
        return Err(TournamentError::Validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_match() -> Match {
        Match {
            id: 1,
            tournament_id: 1,
            round_name: "Quarterfinals".to_string(),
            team_a: "Nova Squad".to_string(),
            team_b: "Iron Hawks".to_string(),
            scheduled_at: None,
            team_a_score: None,
            team_b_score: None,
            winner: None,
            status: MatchStatus::Scheduled,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            TournamentStatus::RegistrationOpen,
            TournamentStatus::Upcoming,
            TournamentStatus::Live,
            TournamentStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<TournamentStatus>(), Ok(status));
        }
        assert!("scheduled".parse::<TournamentStatus>().is_err());
    }

    #[test]
    fn test_draft_defaults_from_json() {
        let draft: TournamentDraft =
            serde_json::from_str(r#"{"name": "Night Cup", "game": "CS2"}"#).unwrap();
        assert_eq!(draft.format, DEFAULT_FORMAT);
        assert_eq!(draft.status, TournamentStatus::RegistrationOpen);
        assert_eq!(draft.max_teams, DEFAULT_MAX_TEAMS);
        assert_eq!(draft.prize_pool, 0);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_draft_rejects_end_before_start() {
        let start = Utc::now();
        let draft = TournamentDraft::new("Night Cup", "CS2")
            .with_schedule(Some(start), Some(start - Duration::days(1)));
        assert!(matches!(
            draft.validate(),
            Err(TournamentError::Validation(_))
        ));

        let same_day = TournamentDraft::new("Night Cup", "CS2").with_schedule(Some(start), Some(start));
        assert!(same_day.validate().is_ok());
    }

    #[test]
    fn test_draft_rejects_bad_numbers_and_names() {
        assert!(TournamentDraft::new("Night Cup", "CS2").with_max_teams(0).validate().is_err());

        let mut negative_prize = TournamentDraft::new("Night Cup", "CS2");
        negative_prize.prize_pool = -1;
        assert!(negative_prize.validate().is_err());

        assert!(TournamentDraft::new("X", "CS2").validate().is_err());
        assert!(TournamentDraft::new("   ", "CS2").validate().is_err());
    }

    #[test]
    fn test_resolve_winner_by_score() {
        let m = sample_match();
        assert_eq!(
            MatchResult::new(3, 1).resolve_winner(&m),
            Some("Nova Squad".to_string())
        );
        assert_eq!(
            MatchResult::new(0, 2).resolve_winner(&m),
            Some("Iron Hawks".to_string())
        );
        assert_eq!(MatchResult::new(2, 2).resolve_winner(&m), None);
    }

    #[test]
    fn test_resolve_winner_explicit_is_verbatim() {
        let m = sample_match();
        assert_eq!(
            MatchResult::new(0, 5)
                .with_winner("Someone Else")
                .resolve_winner(&m),
            Some("Someone Else".to_string())
        );
        // Empty explicit winner falls back to the scores
        assert_eq!(
            MatchResult::new(4, 1).with_winner("").resolve_winner(&m),
            Some("Nova Squad".to_string())
        );
        assert_eq!(
            MatchResult::new(4, 1).with_winner("   ").resolve_winner(&m),
            Some("   ".to_string())
        );
    }

    #[test]
    fn test_match_result_rejects_negative_scores() {
        assert!(MatchResult::new(-1, 0).validate().is_err());
        assert!(MatchResult::new(0, -3).validate().is_err());
        assert!(MatchResult::new(0, 0).validate().is_ok());
    }

    #[test]
    fn test_announcement_validation() {
        assert!(AnnouncementDraft::new("Check-in", "Opens at noon").validate().is_ok());
        assert!(AnnouncementDraft::new("", "Opens at noon").validate().is_err());
        assert!(AnnouncementDraft::new("Check-in", " ").validate().is_err());
    }

    #[test]
    fn test_summary_serializes_flat() {
        let summary = TournamentSummary {
            tournament: Tournament {
                id: 7,
                name: "Night Cup".to_string(),
                game: "CS2".to_string(),
                format: DEFAULT_FORMAT.to_string(),
                status: TournamentStatus::Live,
                location: None,
                description: None,
                start_date: None,
                end_date: None,
                prize_pool: 5000,
                max_teams: 8,
                created_by_user_id: Some(1),
                created_at: Utc::now(),
            },
            participants_count: 2,
            matches_count: 1,
            is_registered: false,
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["status"], "live");
        assert_eq!(value["participants_count"], 2);
    }
}

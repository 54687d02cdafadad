//! PostgreSQL store backed by sqlx.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::str::FromStr;

use super::errors::{StoreError, StoreResult};
use super::repository::{StoreTx, TournamentStore, UserRepository};
use super::timeouts::{DEFAULT_TRANSACTION_TIMEOUT, with_default_timeout, with_timeout};
use crate::auth::{NewUser, Role, User, UserCredentials, UserId};
use crate::tournament::{
    Announcement, AnnouncementDraft, Match, MatchDraft, MatchId, MatchResult, MatchStatus,
    NewRegistration, Registration, RegistrationId, RegistrationStatus, Tournament,
    TournamentDraft, TournamentId, TournamentStatus,
};

const TOURNAMENT_COLUMNS: &str = "id, name, game, format, status, location, description, \
     start_date, end_date, prize_pool, max_teams, created_by_user_id, created_at";

const REGISTRATION_COLUMNS: &str =
    "id, tournament_id, user_id, team_name, status, points, created_at";

const MATCH_COLUMNS: &str = "id, tournament_id, round_name, team_a, team_b, scheduled_at, \
     team_a_score, team_b_score, winner, status, created_at";

/// PostgreSQL implementation of [`TournamentStore`] and [`UserRepository`]
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TournamentStore for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let tx = with_timeout(DEFAULT_TRANSACTION_TIMEOUT, self.pool.begin()).await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn health_check(&self) -> StoreResult<()> {
        with_default_timeout(sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }
}

/// Open PostgreSQL transaction; rolls back when dropped
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn insert_tournament(
        &mut self,
        draft: &TournamentDraft,
        created_by: Option<UserId>,
    ) -> StoreResult<Tournament> {
        let sql = format!(
            "INSERT INTO tournaments
                (name, game, format, status, location, description,
                 start_date, end_date, prize_pool, max_teams, created_by_user_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {TOURNAMENT_COLUMNS}"
        );
        let row = with_default_timeout(
            sqlx::query(&sql)
                .bind(&draft.name)
                .bind(&draft.game)
                .bind(&draft.format)
                .bind(draft.status.as_str())
                .bind(&draft.location)
                .bind(&draft.description)
                .bind(draft.start_date)
                .bind(draft.end_date)
                .bind(draft.prize_pool)
                .bind(draft.max_teams)
                .bind(created_by)
                .fetch_one(&mut *self.tx),
        )
        .await?;

        tournament_from_row(&row)
    }

    async fn get_tournament(&mut self, id: TournamentId) -> StoreResult<Option<Tournament>> {
        let sql = format!("SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = $1");
        let row = with_default_timeout(
            sqlx::query(&sql).bind(id).fetch_optional(&mut *self.tx),
        )
        .await?;

        row.as_ref().map(tournament_from_row).transpose()
    }

    async fn lock_tournament(&mut self, id: TournamentId) -> StoreResult<Option<Tournament>> {
        let sql = format!("SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = $1 FOR UPDATE");
        let row = with_default_timeout(
            sqlx::query(&sql).bind(id).fetch_optional(&mut *self.tx),
        )
        .await?;

        row.as_ref().map(tournament_from_row).transpose()
    }

    async fn list_tournaments(&mut self) -> StoreResult<Vec<Tournament>> {
        let sql = format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments
             ORDER BY start_date ASC NULLS LAST, created_at DESC, id DESC"
        );
        let rows = with_default_timeout(sqlx::query(&sql).fetch_all(&mut *self.tx)).await?;

        rows.iter().map(tournament_from_row).collect()
    }

    async fn update_tournament_status(
        &mut self,
        id: TournamentId,
        status: TournamentStatus,
    ) -> StoreResult<Option<Tournament>> {
        let sql = format!(
            "UPDATE tournaments SET status = $1 WHERE id = $2 RETURNING {TOURNAMENT_COLUMNS}"
        );
        let row = with_default_timeout(
            sqlx::query(&sql)
                .bind(status.as_str())
                .bind(id)
                .fetch_optional(&mut *self.tx),
        )
        .await?;

        row.as_ref().map(tournament_from_row).transpose()
    }

    async fn count_registrations(&mut self, tournament_id: TournamentId) -> StoreResult<i64> {
        let row = with_default_timeout(
            sqlx::query("SELECT COUNT(*) AS n FROM tournament_registrations WHERE tournament_id = $1")
                .bind(tournament_id)
                .fetch_one(&mut *self.tx),
        )
        .await?;

        Ok(row.try_get("n")?)
    }

    async fn count_matches(&mut self, tournament_id: TournamentId) -> StoreResult<i64> {
        let row = with_default_timeout(
            sqlx::query("SELECT COUNT(*) AS n FROM matches WHERE tournament_id = $1")
                .bind(tournament_id)
                .fetch_one(&mut *self.tx),
        )
        .await?;

        Ok(row.try_get("n")?)
    }

    async fn find_registration(
        &mut self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> StoreResult<Option<Registration>> {
        let sql = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM tournament_registrations
             WHERE tournament_id = $1 AND user_id = $2"
        );
        let row = with_default_timeout(
            sqlx::query(&sql)
                .bind(tournament_id)
                .bind(user_id)
                .fetch_optional(&mut *self.tx),
        )
        .await?;

        row.as_ref().map(registration_from_row).transpose()
    }

    async fn insert_registration(
        &mut self,
        registration: &NewRegistration,
    ) -> StoreResult<Registration> {
        let sql = format!(
            "INSERT INTO tournament_registrations (tournament_id, user_id, team_name, status, points)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {REGISTRATION_COLUMNS}"
        );
        let row = with_default_timeout(
            sqlx::query(&sql)
                .bind(registration.tournament_id)
                .bind(registration.user_id)
                .bind(&registration.team_name)
                .bind(registration.status.as_str())
                .bind(registration.points)
                .fetch_one(&mut *self.tx),
        )
        .await?;

        registration_from_row(&row)
    }

    async fn list_registrations(
        &mut self,
        tournament_id: TournamentId,
    ) -> StoreResult<Vec<Registration>> {
        let sql = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM tournament_registrations
             WHERE tournament_id = $1
             ORDER BY id ASC"
        );
        let rows = with_default_timeout(
            sqlx::query(&sql).bind(tournament_id).fetch_all(&mut *self.tx),
        )
        .await?;

        rows.iter().map(registration_from_row).collect()
    }

    async fn registrations_for_user(
        &mut self,
        user_id: UserId,
    ) -> StoreResult<Vec<(Registration, Tournament)>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT r.id, r.tournament_id, r.user_id, r.team_name, r.status, r.points,
                        r.created_at,
                        t.name AS t_name, t.game AS t_game, t.format AS t_format,
                        t.status AS t_status, t.location AS t_location,
                        t.description AS t_description, t.start_date AS t_start_date,
                        t.end_date AS t_end_date, t.prize_pool AS t_prize_pool,
                        t.max_teams AS t_max_teams,
                        t.created_by_user_id AS t_created_by_user_id,
                        t.created_at AS t_created_at
                 FROM tournament_registrations r
                 JOIN tournaments t ON t.id = r.tournament_id
                 WHERE r.user_id = $1
                 ORDER BY r.created_at DESC, r.id DESC",
            )
            .bind(user_id)
            .fetch_all(&mut *self.tx),
        )
        .await?;

        rows.iter()
            .map(|row| {
                let registration = registration_from_row(row)?;
                let tournament = Tournament {
                    id: registration.tournament_id,
                    name: row.try_get("t_name")?,
                    game: row.try_get("t_game")?,
                    format: row.try_get("t_format")?,
                    status: parse_column(row, "t_status")?,
                    location: row.try_get("t_location")?,
                    description: row.try_get("t_description")?,
                    start_date: row.try_get("t_start_date")?,
                    end_date: row.try_get("t_end_date")?,
                    prize_pool: row.try_get("t_prize_pool")?,
                    max_teams: row.try_get("t_max_teams")?,
                    created_by_user_id: row.try_get("t_created_by_user_id")?,
                    created_at: row.try_get("t_created_at")?,
                };
                Ok((registration, tournament))
            })
            .collect()
    }

    async fn find_registration_by_team(
        &mut self,
        tournament_id: TournamentId,
        team_name: &str,
    ) -> StoreResult<Option<Registration>> {
        let sql = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM tournament_registrations
             WHERE tournament_id = $1 AND team_name = $2
             ORDER BY created_at ASC, id ASC
             LIMIT 1"
        );
        let row = with_default_timeout(
            sqlx::query(&sql)
                .bind(tournament_id)
                .bind(team_name)
                .fetch_optional(&mut *self.tx),
        )
        .await?;

        row.as_ref().map(registration_from_row).transpose()
    }

    async fn add_points(
        &mut self,
        registration_id: RegistrationId,
        points: i64,
    ) -> StoreResult<()> {
        with_default_timeout(
            sqlx::query("UPDATE tournament_registrations SET points = points + $1 WHERE id = $2")
                .bind(points)
                .bind(registration_id)
                .execute(&mut *self.tx),
        )
        .await?;
        Ok(())
    }

    async fn insert_match(
        &mut self,
        tournament_id: TournamentId,
        draft: &MatchDraft,
    ) -> StoreResult<Match> {
        let sql = format!(
            "INSERT INTO matches (tournament_id, round_name, team_a, team_b, scheduled_at, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {MATCH_COLUMNS}"
        );
        let row = with_default_timeout(
            sqlx::query(&sql)
                .bind(tournament_id)
                .bind(&draft.round_name)
                .bind(&draft.team_a)
                .bind(&draft.team_b)
                .bind(draft.scheduled_at)
                .bind(MatchStatus::Scheduled.as_str())
                .fetch_one(&mut *self.tx),
        )
        .await?;

        match_from_row(&row)
    }

    async fn find_match(
        &mut self,
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> StoreResult<Option<Match>> {
        let sql =
            format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1 AND tournament_id = $2");
        let row = with_default_timeout(
            sqlx::query(&sql)
                .bind(match_id)
                .bind(tournament_id)
                .fetch_optional(&mut *self.tx),
        )
        .await?;

        row.as_ref().map(match_from_row).transpose()
    }

    async fn update_match_result(
        &mut self,
        match_id: MatchId,
        result: &MatchResult,
        winner: Option<&str>,
    ) -> StoreResult<Option<Match>> {
        let sql = format!(
            "UPDATE matches
             SET team_a_score = $1, team_b_score = $2, winner = $3, status = $4
             WHERE id = $5
             RETURNING {MATCH_COLUMNS}"
        );
        let row = with_default_timeout(
            sqlx::query(&sql)
                .bind(result.team_a_score)
                .bind(result.team_b_score)
                .bind(winner)
                .bind(MatchStatus::Finished.as_str())
                .bind(match_id)
                .fetch_optional(&mut *self.tx),
        )
        .await?;

        row.as_ref().map(match_from_row).transpose()
    }

    async fn list_matches(&mut self, tournament_id: TournamentId) -> StoreResult<Vec<Match>> {
        let sql = format!(
            "SELECT {MATCH_COLUMNS} FROM matches
             WHERE tournament_id = $1
             ORDER BY round_name ASC, created_at ASC, id ASC"
        );
        let rows = with_default_timeout(
            sqlx::query(&sql).bind(tournament_id).fetch_all(&mut *self.tx),
        )
        .await?;

        rows.iter().map(match_from_row).collect()
    }

    async fn insert_announcement(
        &mut self,
        tournament_id: TournamentId,
        draft: &AnnouncementDraft,
    ) -> StoreResult<Announcement> {
        let row = with_default_timeout(
            sqlx::query(
                "INSERT INTO announcements (tournament_id, title, content)
                 VALUES ($1, $2, $3)
                 RETURNING id, tournament_id, title, content, created_at",
            )
            .bind(tournament_id)
            .bind(&draft.title)
            .bind(&draft.content)
            .fetch_one(&mut *self.tx),
        )
        .await?;

        announcement_from_row(&row)
    }

    async fn list_announcements(
        &mut self,
        tournament_id: TournamentId,
    ) -> StoreResult<Vec<Announcement>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT id, tournament_id, title, content, created_at FROM announcements
                 WHERE tournament_id = $1
                 ORDER BY created_at DESC, id DESC",
            )
            .bind(tournament_id)
            .fetch_all(&mut *self.tx),
        )
        .await?;

        rows.iter().map(announcement_from_row).collect()
    }

    async fn find_user_name(&mut self, user_id: UserId) -> StoreResult<Option<String>> {
        let row = with_default_timeout(
            sqlx::query("SELECT name FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&mut *self.tx),
        )
        .await?;

        Ok(row.map(|r| r.try_get::<String, _>("name")).transpose()?)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let PgTx { tx } = *self;
        with_timeout(DEFAULT_TRANSACTION_TIMEOUT, tx.commit()).await
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let row = with_default_timeout(
            sqlx::query(
                "INSERT INTO users (email, name, password_hash, role) VALUES ($1, $2, $3, $4)
                 RETURNING id, email, name, role, created_at",
            )
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool),
        )
        .await?;

        user_from_row(&row)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserCredentials>> {
        let row = with_default_timeout(
            sqlx::query(
                "SELECT id, email, name, role, created_at, password_hash FROM users WHERE email = $1",
            )
            .bind(email)
            .fetch_optional(&self.pool),
        )
        .await?;

        row.map(|r| {
            Ok(UserCredentials {
                user: user_from_row(&r)?,
                password_hash: r.try_get("password_hash")?,
            })
        })
        .transpose()
    }

    async fn find_by_id(&self, user_id: UserId) -> StoreResult<Option<User>> {
        let row = with_default_timeout(
            sqlx::query("SELECT id, email, name, role, created_at FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool),
        )
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }
}

/// Parse a text column into one of the domain enums
fn parse_column<T>(row: &PgRow, column: &str) -> StoreResult<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(StoreError::Decode)
}

fn tournament_from_row(row: &PgRow) -> StoreResult<Tournament> {
    Ok(Tournament {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        game: row.try_get("game")?,
        format: row.try_get("format")?,
        status: parse_column::<TournamentStatus>(row, "status")?,
        location: row.try_get("location")?,
        description: row.try_get("description")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        prize_pool: row.try_get("prize_pool")?,
        max_teams: row.try_get("max_teams")?,
        created_by_user_id: row.try_get("created_by_user_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn registration_from_row(row: &PgRow) -> StoreResult<Registration> {
    Ok(Registration {
        id: row.try_get("id")?,
        tournament_id: row.try_get("tournament_id")?,
        user_id: row.try_get("user_id")?,
        team_name: row.try_get("team_name")?,
        status: parse_column::<RegistrationStatus>(row, "status")?,
        points: row.try_get("points")?,
        created_at: row.try_get("created_at")?,
    })
}

fn match_from_row(row: &PgRow) -> StoreResult<Match> {
    Ok(Match {
        id: row.try_get("id")?,
        tournament_id: row.try_get("tournament_id")?,
        round_name: row.try_get("round_name")?,
        team_a: row.try_get("team_a")?,
        team_b: row.try_get("team_b")?,
        scheduled_at: row.try_get("scheduled_at")?,
        team_a_score: row.try_get("team_a_score")?,
        team_b_score: row.try_get("team_b_score")?,
        winner: row.try_get("winner")?,
        status: parse_column::<MatchStatus>(row, "status")?,
        created_at: row.try_get("created_at")?,
    })
}

fn announcement_from_row(row: &PgRow) -> StoreResult<Announcement> {
    Ok(Announcement {
        id: row.try_get("id")?,
        tournament_id: row.try_get("tournament_id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
    })
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        role: parse_column::<Role>(row, "role")?,
        created_at: row.try_get("created_at")?,
    })
}

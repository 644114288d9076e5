//! Diesel row models for fleet persistence.

use super::schema::{checkouts, trucks, users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for truck records.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = trucks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TruckRow {
    /// Internal truck identifier.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub id: uuid::Uuid,
    /// Catalog name.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub name: String,
    /// Optional default team.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Varchar>)]
    pub default_team: Option<String>,
    /// External calendar correlation id.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub calendar_id: uuid::Uuid,
    /// Availability flag.
    #[diesel(sql_type = diesel::sql_types::Bool)]
    pub is_checked_out: bool,
}

/// Insert model for truck records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = trucks)]
pub struct NewTruckRow {
    /// Internal truck identifier.
    pub id: uuid::Uuid,
    /// Catalog name.
    pub name: String,
    /// Optional default team.
    pub default_team: Option<String>,
    /// External calendar correlation id.
    pub calendar_id: uuid::Uuid,
    /// Availability flag.
    pub is_checked_out: bool,
}

/// Query result row for reservation records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = checkouts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReservationRow {
    /// Reservation identifier.
    pub id: uuid::Uuid,
    /// Reserved truck.
    pub truck_id: uuid::Uuid,
    /// Chat-platform requester id.
    pub user_id: String,
    /// Requester display name.
    pub user_name: String,
    /// Booking team.
    pub team_name: String,
    /// Optional purpose.
    pub purpose: Option<String>,
    /// Window start.
    pub start_date: DateTime<Utc>,
    /// Window end.
    pub end_date: DateTime<Utc>,
    /// Insertion timestamp.
    pub created_at: DateTime<Utc>,
    /// Releasing chat user.
    pub released_by: Option<String>,
    /// Release instant.
    pub released_at: Option<DateTime<Utc>>,
}

/// Insert model for reservation records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = checkouts)]
pub struct NewReservationRow {
    /// Reservation identifier.
    pub id: uuid::Uuid,
    /// Reserved truck.
    pub truck_id: uuid::Uuid,
    /// Chat-platform requester id.
    pub user_id: String,
    /// Requester display name.
    pub user_name: String,
    /// Booking team.
    pub team_name: String,
    /// Optional purpose.
    pub purpose: Option<String>,
    /// Window start.
    pub start_date: DateTime<Utc>,
    /// Window end.
    pub end_date: DateTime<Utc>,
    /// Insertion timestamp.
    pub created_at: DateTime<Utc>,
    /// Releasing chat user.
    pub released_by: Option<String>,
    /// Release instant.
    pub released_at: Option<DateTime<Utc>>,
}

/// Query result and insert model for user profiles.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Local identifier.
    pub id: uuid::Uuid,
    /// Chat-platform user id.
    pub slack_user_id: String,
    /// Display name.
    pub username: String,
    /// Team.
    pub team: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

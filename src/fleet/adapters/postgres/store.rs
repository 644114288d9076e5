//! `PostgreSQL` implementation of the transactional fleet store.

use super::{
    models::{NewReservationRow, NewTruckRow, ReservationRow, TruckRow, UserRow},
    schema::{checkouts, trucks, users},
};
use crate::fleet::{
    domain::{
        CalendarId, ChatUserId, PersistedReservationData, PersistedTruckData, PersistedUserData,
        ReleaseRecord, Requester, Reservation, ReservationId, ReservationWindow, TeamName, Truck,
        TruckId, TruckName, UserId, UserProfile,
    },
    ports::{
        FleetStore, FleetStoreError, FleetStoreResult, FleetTransaction, ReservationLedger,
        TruckRegistry, UserDirectory, single_active,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by fleet adapters.
pub type FleetPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed fleet store.
///
/// Every unit of work runs inside one database transaction on a pooled
/// connection. Checkout serializes on the truck row through
/// `SELECT ... FOR UPDATE`.
#[derive(Debug, Clone)]
pub struct PostgresFleetStore {
    pool: FleetPgPool,
}

impl PostgresFleetStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: FleetPgPool) -> Self {
        Self { pool }
    }
}

/// Why a database transaction was rolled back.
enum TxAbort<E> {
    Work(E),
    Database(DieselError),
}

impl<E> From<DieselError> for TxAbort<E> {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

#[async_trait]
impl FleetStore for PostgresFleetStore {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<FleetStoreError> + Send + 'static,
        F: FnOnce(&mut dyn FleetTransaction) -> Result<T, E> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut pooled = pool
                .get()
                .map_err(|err| E::from(FleetStoreError::persistence(err)))?;
            let connection: &mut PgConnection = &mut pooled;
            connection
                .transaction::<T, TxAbort<E>, _>(|conn| {
                    let mut tx = PgFleetTransaction { conn };
                    work(&mut tx).map_err(TxAbort::Work)
                })
                .map_err(|abort| match abort {
                    TxAbort::Work(err) => err,
                    TxAbort::Database(err) => E::from(FleetStoreError::persistence(err)),
                })
        })
        .await
        .map_err(|err| E::from(FleetStoreError::persistence(err)))?
    }
}

/// Registry, ledger and directory views over one open transaction.
struct PgFleetTransaction<'conn> {
    conn: &'conn mut PgConnection,
}

impl TruckRegistry for PgFleetTransaction<'_> {
    fn insert_truck(&mut self, truck: &Truck) -> FleetStoreResult<()> {
        let row = NewTruckRow {
            id: truck.id().into_inner(),
            name: truck.name().as_str().to_owned(),
            default_team: truck.default_team().map(|team| team.as_str().to_owned()),
            calendar_id: truck.calendar_id().into_inner(),
            is_checked_out: truck.is_checked_out(),
        };
        diesel::insert_into(trucks::table)
            .values(&row)
            .execute(self.conn)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    FleetStoreError::DuplicateTruckName(truck.name())
                }
                _ => FleetStoreError::persistence(err),
            })?;
        Ok(())
    }

    fn find_truck_by_name(&mut self, name: TruckName) -> FleetStoreResult<Option<Truck>> {
        let row = trucks::table
            .filter(trucks::name.eq(name.as_str()))
            .select(TruckRow::as_select())
            .first::<TruckRow>(self.conn)
            .optional()
            .map_err(FleetStoreError::persistence)?;
        row.map(row_to_truck).transpose()
    }

    fn lock_truck_by_name(&mut self, name: TruckName) -> FleetStoreResult<Option<Truck>> {
        let row = trucks::table
            .filter(trucks::name.eq(name.as_str()))
            .select(TruckRow::as_select())
            .for_update()
            .first::<TruckRow>(self.conn)
            .optional()
            .map_err(FleetStoreError::persistence)?;
        row.map(row_to_truck).transpose()
    }

    fn find_truck_by_id(&mut self, id: TruckId) -> FleetStoreResult<Option<Truck>> {
        let row = trucks::table
            .find(id.into_inner())
            .select(TruckRow::as_select())
            .first::<TruckRow>(self.conn)
            .optional()
            .map_err(FleetStoreError::persistence)?;
        row.map(row_to_truck).transpose()
    }

    fn update_truck(&mut self, truck: &Truck) -> FleetStoreResult<()> {
        let updated = diesel::update(trucks::table.find(truck.id().into_inner()))
            .set((
                trucks::name.eq(truck.name().as_str()),
                trucks::default_team.eq(truck.default_team().map(TeamName::as_str)),
                trucks::calendar_id.eq(truck.calendar_id().into_inner()),
                trucks::is_checked_out.eq(truck.is_checked_out()),
            ))
            .execute(self.conn)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    FleetStoreError::DuplicateTruckName(truck.name())
                }
                _ => FleetStoreError::persistence(err),
            })?;
        if updated == 0 {
            return Err(FleetStoreError::TruckNotFound(truck.id()));
        }
        Ok(())
    }

    fn list_trucks(&mut self) -> FleetStoreResult<Vec<Truck>> {
        trucks::table
            .order(trucks::name.asc())
            .select(TruckRow::as_select())
            .load::<TruckRow>(self.conn)
            .map_err(FleetStoreError::persistence)?
            .into_iter()
            .map(row_to_truck)
            .collect()
    }

    fn trucks_by_availability(
        &mut self,
        as_of: DateTime<Utc>,
        want_checked_out: bool,
    ) -> FleetStoreResult<Vec<Truck>> {
        let query = diesel::sql_query(concat!(
            "SELECT t.id, t.name, t.default_team, t.calendar_id, t.is_checked_out ",
            "FROM trucks t ",
            "WHERE t.is_checked_out = $1 ",
            "AND EXISTS (",
            "SELECT 1 FROM checkouts r ",
            "WHERE r.truck_id = t.id ",
            "AND r.released_at IS NULL ",
            "AND r.start_date <= $2 ",
            "AND r.end_date > $2",
            ") = $1 ",
            "ORDER BY t.name",
        ))
        .bind::<diesel::sql_types::Bool, _>(want_checked_out)
        .bind::<diesel::sql_types::Timestamptz, _>(as_of);

        query
            .load::<TruckRow>(self.conn)
            .map_err(FleetStoreError::persistence)?
            .into_iter()
            .map(row_to_truck)
            .collect()
    }
}

impl ReservationLedger for PgFleetTransaction<'_> {
    fn insert_reservation(&mut self, reservation: &Reservation) -> FleetStoreResult<()> {
        let row = to_new_reservation_row(reservation);
        diesel::insert_into(checkouts::table)
            .values(&row)
            .execute(self.conn)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    FleetStoreError::DuplicateReservation(reservation.id())
                }
                DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                    FleetStoreError::TruckNotFound(reservation.truck_id())
                }
                _ => FleetStoreError::persistence(err),
            })?;
        Ok(())
    }

    fn find_reservation(&mut self, id: ReservationId) -> FleetStoreResult<Option<Reservation>> {
        let row = checkouts::table
            .find(id.into_inner())
            .select(ReservationRow::as_select())
            .first::<ReservationRow>(self.conn)
            .optional()
            .map_err(FleetStoreError::persistence)?;
        row.map(row_to_reservation).transpose()
    }

    fn active_reservation_for_truck(
        &mut self,
        truck_id: TruckId,
        as_of: DateTime<Utc>,
    ) -> FleetStoreResult<Option<Reservation>> {
        let candidates = checkouts::table
            .filter(checkouts::truck_id.eq(truck_id.into_inner()))
            .filter(checkouts::released_at.is_null())
            .filter(checkouts::start_date.le(as_of))
            .filter(checkouts::end_date.gt(as_of))
            .select(ReservationRow::as_select())
            .load::<ReservationRow>(self.conn)
            .map_err(FleetStoreError::persistence)?
            .into_iter()
            .map(row_to_reservation)
            .collect::<FleetStoreResult<Vec<_>>>()?;
        single_active(truck_id, candidates)
    }

    fn release_reservation(
        &mut self,
        id: ReservationId,
        released_by: &ChatUserId,
        released_at: DateTime<Utc>,
    ) -> FleetStoreResult<()> {
        let updated = diesel::update(
            checkouts::table
                .find(id.into_inner())
                .filter(checkouts::released_at.is_null()),
        )
        .set((
            checkouts::released_by.eq(released_by.as_str()),
            checkouts::released_at.eq(released_at),
        ))
        .execute(self.conn)
        .map_err(FleetStoreError::persistence)?;
        if updated == 1 {
            return Ok(());
        }
        match self.find_reservation(id)? {
            Some(_) => Err(FleetStoreError::AlreadyReleased(id)),
            None => Err(FleetStoreError::ReservationNotFound(id)),
        }
    }

    fn open_reservations_for_truck(
        &mut self,
        truck_id: TruckId,
    ) -> FleetStoreResult<Vec<Reservation>> {
        checkouts::table
            .filter(checkouts::truck_id.eq(truck_id.into_inner()))
            .filter(checkouts::released_at.is_null())
            .order((checkouts::start_date.asc(), checkouts::created_at.asc()))
            .select(ReservationRow::as_select())
            .load::<ReservationRow>(self.conn)
            .map_err(FleetStoreError::persistence)?
            .into_iter()
            .map(row_to_reservation)
            .collect()
    }

    fn reservation_history(&mut self, truck_id: TruckId) -> FleetStoreResult<Vec<Reservation>> {
        checkouts::table
            .filter(checkouts::truck_id.eq(truck_id.into_inner()))
            .order(checkouts::created_at.desc())
            .select(ReservationRow::as_select())
            .load::<ReservationRow>(self.conn)
            .map_err(FleetStoreError::persistence)?
            .into_iter()
            .map(row_to_reservation)
            .collect()
    }
}

impl UserDirectory for PgFleetTransaction<'_> {
    fn find_user(&mut self, chat_user_id: &ChatUserId) -> FleetStoreResult<Option<UserProfile>> {
        let row = users::table
            .filter(users::slack_user_id.eq(chat_user_id.as_str()))
            .select(UserRow::as_select())
            .first::<UserRow>(self.conn)
            .optional()
            .map_err(FleetStoreError::persistence)?;
        row.map(row_to_user).transpose()
    }

    fn insert_user(&mut self, user: &UserProfile) -> FleetStoreResult<()> {
        let row = UserRow {
            id: user.id().into_inner(),
            slack_user_id: user.chat_user_id().as_str().to_owned(),
            username: user.username().to_owned(),
            team: user.team().as_str().to_owned(),
            created_at: user.created_at(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(self.conn)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    FleetStoreError::DuplicateUser(user.chat_user_id().clone())
                }
                _ => FleetStoreError::persistence(err),
            })?;
        Ok(())
    }

    fn update_user(&mut self, user: &UserProfile) -> FleetStoreResult<()> {
        let updated = diesel::update(
            users::table.filter(users::slack_user_id.eq(user.chat_user_id().as_str())),
        )
        .set((
            users::username.eq(user.username()),
            users::team.eq(user.team().as_str()),
        ))
        .execute(self.conn)
        .map_err(FleetStoreError::persistence)?;
        if updated == 0 {
            return Err(FleetStoreError::UserNotFound(user.chat_user_id().clone()));
        }
        Ok(())
    }

    fn list_users(&mut self) -> FleetStoreResult<Vec<UserProfile>> {
        users::table
            .order(users::username.asc())
            .select(UserRow::as_select())
            .load::<UserRow>(self.conn)
            .map_err(FleetStoreError::persistence)?
            .into_iter()
            .map(row_to_user)
            .collect()
    }
}

fn to_new_reservation_row(reservation: &Reservation) -> NewReservationRow {
    let requester = reservation.requester();
    let release = reservation.release_record();
    NewReservationRow {
        id: reservation.id().into_inner(),
        truck_id: reservation.truck_id().into_inner(),
        user_id: requester.user_id.as_str().to_owned(),
        user_name: requester.user_name.clone(),
        team_name: requester.team.as_str().to_owned(),
        purpose: reservation.purpose().map(str::to_owned),
        start_date: reservation.window().start(),
        end_date: reservation.window().end(),
        created_at: reservation.created_at(),
        released_by: release.map(|record| record.released_by().as_str().to_owned()),
        released_at: release.map(ReleaseRecord::released_at),
    }
}

fn row_to_truck(row: TruckRow) -> FleetStoreResult<Truck> {
    let name = TruckName::try_from(row.name.as_str()).map_err(FleetStoreError::persistence)?;
    let default_team = row
        .default_team
        .as_deref()
        .map(TeamName::try_from)
        .transpose()
        .map_err(FleetStoreError::persistence)?;
    Ok(Truck::from_persisted(PersistedTruckData {
        id: TruckId::from_uuid(row.id),
        name,
        default_team,
        calendar_id: CalendarId::from_uuid(row.calendar_id),
        is_checked_out: row.is_checked_out,
    }))
}

fn row_to_reservation(row: ReservationRow) -> FleetStoreResult<Reservation> {
    let ReservationRow {
        id,
        truck_id,
        user_id,
        user_name,
        team_name,
        purpose,
        start_date,
        end_date,
        created_at,
        released_by,
        released_at,
    } = row;

    let requester = Requester {
        user_id: ChatUserId::new(user_id).map_err(FleetStoreError::persistence)?,
        user_name,
        team: TeamName::try_from(team_name.as_str()).map_err(FleetStoreError::persistence)?,
    };
    let window =
        ReservationWindow::new(start_date, end_date).map_err(FleetStoreError::persistence)?;
    let release = match (released_by, released_at) {
        (Some(by), Some(at)) => Some(ReleaseRecord::new(
            ChatUserId::new(by).map_err(FleetStoreError::persistence)?,
            at,
        )),
        (None, None) => None,
        _ => {
            return Err(FleetStoreError::persistence(std::io::Error::other(format!(
                "reservation {id} has partial release audit fields"
            ))));
        }
    };

    Ok(Reservation::from_persisted(PersistedReservationData {
        id: ReservationId::from_uuid(id),
        truck_id: TruckId::from_uuid(truck_id),
        requester,
        window,
        purpose,
        created_at,
        release,
    }))
}

fn row_to_user(row: UserRow) -> FleetStoreResult<UserProfile> {
    Ok(UserProfile::from_persisted(PersistedUserData {
        id: UserId::from_uuid(row.id),
        chat_user_id: ChatUserId::new(row.slack_user_id).map_err(FleetStoreError::persistence)?,
        username: row.username,
        team: TeamName::try_from(row.team.as_str()).map_err(FleetStoreError::persistence)?,
        created_at: row.created_at,
    }))
}

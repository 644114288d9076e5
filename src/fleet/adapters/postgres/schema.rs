//! Diesel schema for fleet persistence.

diesel::table! {
    /// Provisioned trucks and their availability flag.
    trucks (id) {
        /// Internal truck identifier.
        id -> Uuid,
        /// Catalog name.
        #[max_length = 50]
        name -> Varchar,
        /// Optional default team.
        #[max_length = 50]
        default_team -> Nullable<Varchar>,
        /// External calendar correlation id.
        calendar_id -> Uuid,
        /// Authoritative availability flag.
        is_checked_out -> Bool,
        /// Provisioning timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reservation ledger. Rows are never deleted.
    checkouts (id) {
        /// Reservation identifier.
        id -> Uuid,
        /// Reserved truck.
        truck_id -> Uuid,
        /// Chat-platform requester id.
        #[max_length = 64]
        user_id -> Varchar,
        /// Requester display name at checkout time.
        #[max_length = 255]
        user_name -> Varchar,
        /// Team the reservation is booked under.
        #[max_length = 50]
        team_name -> Varchar,
        /// Optional free-text purpose.
        purpose -> Nullable<Text>,
        /// Window start.
        start_date -> Timestamptz,
        /// Window end.
        end_date -> Timestamptz,
        /// Insertion timestamp.
        created_at -> Timestamptz,
        /// Releasing chat user, once released.
        #[max_length = 64]
        released_by -> Nullable<Varchar>,
        /// Release instant, once released.
        released_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Chat identities bound to teams.
    users (id) {
        /// Local user identifier.
        id -> Uuid,
        /// Chat-platform user id.
        #[max_length = 64]
        slack_user_id -> Varchar,
        /// Display name.
        #[max_length = 255]
        username -> Varchar,
        /// Team.
        #[max_length = 50]
        team -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(checkouts -> trucks (truck_id));
diesel::allow_tables_to_appear_in_same_query!(trucks, checkouts, users);

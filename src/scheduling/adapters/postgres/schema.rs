//! Diesel schema for appointment persistence.

diesel::table! {
    /// Appointment records. The urgency class is derived per read and has
    /// no column here.
    appointments (id) {
        /// Appointment identifier.
        id -> Uuid,
        /// Owning client, absent for administrative tasks.
        client_id -> Nullable<Uuid>,
        /// Assigned broker.
        broker_id -> Uuid,
        /// Scheduled instant.
        scheduled_at -> Timestamptz,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Appointment title.
        #[max_length = 160]
        title -> Varchar,
        /// Optional free-text description.
        description -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

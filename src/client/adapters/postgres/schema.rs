//! Diesel schema for client and document persistence.

diesel::table! {
    /// Client records with pipeline and scheduling mirror state.
    clients (id) {
        /// Client identifier.
        id -> Uuid,
        /// Contact payload (name, phone, email).
        contact -> Jsonb,
        /// Acquisition channel label.
        #[max_length = 120]
        origin -> Varchar,
        /// Pipeline status.
        #[max_length = 50]
        status -> Varchar,
        /// Assigned broker, absent while pending.
        broker_id -> Nullable<Uuid>,
        /// Mirrored status of the latest appointment.
        #[max_length = 50]
        scheduling_status -> Nullable<Varchar>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Dependent client documents, removed first during the delete cascade.
    documents (id) {
        /// Document identifier.
        id -> Uuid,
        /// Owning client.
        client_id -> Uuid,
        /// Original upload file name.
        #[max_length = 255]
        file_name -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

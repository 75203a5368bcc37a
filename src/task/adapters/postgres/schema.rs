//! Diesel schema for task persistence.

diesel::table! {
    /// Task records keyed by owning identity.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning identity. Logical reference, not a foreign key.
        owner_id -> Uuid,
        /// Task title.
        #[max_length = 500]
        title -> Varchar,
        /// Optional free-form description.
        description -> Nullable<Text>,
        /// Completion flag.
        completed -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

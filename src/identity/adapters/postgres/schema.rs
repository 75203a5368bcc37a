//! Diesel schema for identity persistence.

diesel::table! {
    /// Guest and linked identities.
    identities (id) {
        /// Internal identity identifier.
        id -> Uuid,
        /// Identity kind (`guest` or `linked`).
        #[max_length = 20]
        kind -> Varchar,
        /// Bound phone, unique when present.
        #[max_length = 32]
        phone -> Nullable<Varchar>,
        /// Unconsumed link code, unique when present.
        #[max_length = 8]
        link_code -> Nullable<Varchar>,
        /// Channel of first contact.
        #[max_length = 20]
        created_via -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

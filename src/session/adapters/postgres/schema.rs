//! Diesel schema for session persistence.

diesel::table! {
    /// One conversational session per phone.
    conversation_sessions (phone) {
        /// Normalized phone, the session key.
        #[max_length = 32]
        phone -> Varchar,
        /// Whether a conversation is in progress.
        active -> Bool,
        /// Opaque context payload.
        context -> Jsonb,
        /// Time of the latest activation or deactivation.
        last_interaction_at -> Timestamptz,
    }
}

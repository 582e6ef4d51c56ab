//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. The
//! `diesel print-schema` command can regenerate them from a live database.

diesel::table! {
    /// Greetings served by `GET /api/hello`; the newest row wins.
    greetings (id) {
        /// Auto-incrementing primary key.
        id -> Int4,
        /// Greeting text.
        message -> Text,
    }
}

//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use diesel::prelude::*;

use super::schema::greetings;

/// Row struct for reading from the greetings table.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = greetings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GreetingRow {
    pub id: i32,
    pub message: String,
}

/// Insertable struct for seeding greetings.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = greetings)]
pub(crate) struct NewGreetingRow<'a> {
    pub message: &'a str,
}

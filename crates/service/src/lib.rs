//! Service layer providing the person record operations on top of models.
//! - Separates business rules (validation, lookup-then-write) from data access.
//! - Reuses validation and the entity definition in the `models` crate.
//! - Keeps "not found" and "query failed" apart internally even where HTTP merges them.

pub mod errors;
pub mod person;
#[cfg(test)]
pub mod test_support;

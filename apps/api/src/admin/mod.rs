//! Admin back-office surfaces: one independent CRUD module per collection.
//! Search and filtering beyond the query params here stay client-side over
//! the fetched array; there is no pagination.

pub mod leads;
pub mod sessions;
pub mod tools;
pub mod users;

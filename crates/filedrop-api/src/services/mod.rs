//! Business logic kept apart from HTTP so it can be tested without a server.

pub mod files;

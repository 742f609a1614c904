pub mod auth;
pub mod competition;
pub mod shared;
pub mod submission;
pub mod team;
pub mod user;

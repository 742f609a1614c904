pub mod competition;
pub mod hash;
pub mod jwt;
pub mod team;
pub mod user;

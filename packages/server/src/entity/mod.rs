pub mod competition;
pub mod competition_participant;
pub mod student_team;
pub mod submission;
pub mod team;
pub mod team_member;
pub mod user;

pub mod movies;
pub mod ratings;
pub mod recommendations;
pub mod status;
pub mod users;

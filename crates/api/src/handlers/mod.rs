pub mod auth;
pub mod figurines;
pub mod users;

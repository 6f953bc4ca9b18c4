pub mod research;
pub mod user;

pub mod admin;
pub mod content;
pub mod recommendations;
pub mod system;
pub mod users;

pub mod admin;
pub mod companies;
pub mod profiles;
pub mod submissions;
pub mod tasks;

pub mod command;
pub mod driver;
pub mod exchange;
pub mod profile;
pub mod session;
pub mod table;

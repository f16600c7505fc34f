pub mod connectivity;
pub mod database;
pub mod gateway;
pub mod notify;
pub mod offline;

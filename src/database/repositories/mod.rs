pub mod company;
pub mod event;
pub mod policy;
pub mod request;
pub mod requirement;
pub mod time_entry;
pub mod worker;

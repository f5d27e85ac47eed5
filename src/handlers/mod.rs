pub mod company;
pub mod events;
pub mod requests;
pub mod requirements;
pub mod shared;
pub mod tracking;
pub mod workers;

pub mod company;
pub mod event;
pub mod request;
pub mod requirement;
pub mod time_entry;
pub mod worker;

// Re-export all models for easy importing
pub use company::*;
pub use event::*;
pub use request::*;
pub use requirement::*;
pub use time_entry::*;
pub use worker::*;

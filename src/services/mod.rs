pub mod assignment;
pub mod fcfs;
pub mod hours;
pub mod notifier;
pub mod policy;

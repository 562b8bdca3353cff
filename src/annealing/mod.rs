pub mod autoschedule;
pub mod controller;

pub use controller::run;

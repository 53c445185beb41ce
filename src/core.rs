pub mod clock;
pub mod comparison;
pub mod engine;
pub mod pricing;
pub mod reading;
pub mod rollover;
pub mod subsystem;
pub mod totals;

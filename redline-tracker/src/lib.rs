//! MBTA Red Line tracker.
//!
//! A live dashboard of alerts, departures, arrivals and vehicle positions
//! for one subway line, plus a batch reporter that turns the same data into
//! a written commute summary.

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod flatten;
pub mod mbta;
pub mod report;

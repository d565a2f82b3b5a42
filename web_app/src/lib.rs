//! # Vet Clinic
//!
//! JSON API to run a veterinary clinic: accounts and roles, pets and their
//! health records, vet schedules and appointment booking, dashboards.

pub mod api;
pub mod config;
pub mod consts;
pub mod front;
pub mod logger;
pub mod metric;
pub mod models;
pub mod repo;
pub mod services;
pub mod utils;

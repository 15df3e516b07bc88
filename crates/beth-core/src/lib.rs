//! Core Beth library (definition catalogs, skill triggers, config, logging).

pub mod agents;
pub mod config;
pub mod definitions;
pub mod logging;
pub mod skills;

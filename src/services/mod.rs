// deckvault services
// Services build on the record store: share links, statistics, configuration.

pub mod settings_engine;
pub mod share_service;
pub mod statistics;

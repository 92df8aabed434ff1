pub mod config;
pub mod credentials;
pub mod roster;
pub mod store;
pub mod sync;
pub mod synergy;
pub mod update;

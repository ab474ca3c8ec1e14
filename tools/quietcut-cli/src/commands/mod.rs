pub mod check;
pub mod config;
pub mod cut;
pub mod fillers;
pub mod silence;
pub mod sounds;

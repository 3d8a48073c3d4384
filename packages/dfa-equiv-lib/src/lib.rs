pub mod automaton;
pub mod config;
pub mod definition;
pub mod logger;
pub mod render;
pub mod report;
pub mod solver;
pub mod validation;

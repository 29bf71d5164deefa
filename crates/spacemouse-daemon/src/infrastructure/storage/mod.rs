//! Storage infrastructure: configuration file persistence for the daemon
//! binary.  Library embedders configure backends directly and never touch
//! this module.

pub mod config;

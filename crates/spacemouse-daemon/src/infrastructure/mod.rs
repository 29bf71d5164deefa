//! Infrastructure layer: OS- and vendor-facing adapters.
//!
//! `backend` holds one adapter per vendor driver plus an in-memory mock;
//! `storage` holds config file persistence.
//!
//! **Dependency rule**: this layer may depend on `spacemouse_core` but MUST
//! NOT import from `application`.

pub mod backend;
pub mod storage;

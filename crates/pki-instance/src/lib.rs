//! Persisted model of a PKI server instance.
//!
//! This crate owns everything that lives on disk: the ordered configuration
//! stores, the instance metadata and ports in `server.cfg`, the subsystems
//! installed under `conf/<kind>/`, and their group directories. It performs
//! no process management; lifecycle control lives in the command-line crate.

mod descriptor;
mod error;
mod groups;
mod instance;
mod kind;
mod network;
mod store;
mod subsystem;

pub use descriptor::{SecurityDomain, SubsystemDescriptor};
pub use error::InstanceError;
pub use groups::{FileGroupDirectory, GroupDirectory, GroupError};
pub use instance::{
    DEFAULT_INSTANCE_GROUP, DEFAULT_INSTANCE_USER, Instance, InstanceHandle, InstanceSettings,
    InstanceType,
};
pub use kind::SubsystemKind;
pub use network::{DEFAULT_SECURE_PORT, DEFAULT_SERVICE_PORT, DEFAULT_UNSECURE_PORT, NetworkConfig};
pub use store::{ConfigStore, StoreError};
pub use subsystem::Subsystem;

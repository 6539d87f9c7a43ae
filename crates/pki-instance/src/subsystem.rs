//! A subsystem attached to a loaded instance.

use std::path::PathBuf;

use pki_config::InstancePaths;
use tracing::debug;

use crate::descriptor::SubsystemDescriptor;
use crate::error::InstanceError;
use crate::kind::SubsystemKind;
use crate::store::ConfigStore;

/// One subsystem together with its configuration store.
#[derive(Debug, Clone)]
pub struct Subsystem {
    kind: SubsystemKind,
    store: ConfigStore,
    deployment_descriptor: PathBuf,
}

impl Subsystem {
    /// Loads `kind` from `paths`, returning `None` when it is not installed.
    pub(crate) fn load(
        paths: &InstancePaths,
        kind: SubsystemKind,
    ) -> Result<Option<Self>, InstanceError> {
        let store = match ConfigStore::load(paths.subsystem_config_path(kind.as_str())) {
            Ok(store) => store,
            Err(error) if error.is_not_found() => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        debug!(
            target: "pki_instance::subsystem",
            subsystem = kind.as_str(),
            entries = store.len(),
            "loaded subsystem configuration"
        );
        Ok(Some(Self {
            kind,
            store,
            deployment_descriptor: paths.deployment_descriptor_path(kind.as_str()),
        }))
    }

    /// Kind of this subsystem.
    pub fn kind(&self) -> SubsystemKind {
        self.kind
    }

    /// Configuration store.
    pub fn config(&self) -> &ConfigStore {
        &self.store
    }

    /// Mutable configuration store; changes need [`ConfigStore::persist`].
    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.store
    }

    /// Whether the subsystem's deployment descriptor exists.
    pub fn is_enabled(&self) -> bool {
        self.deployment_descriptor.is_file()
    }

    /// Read-only display view over the current configuration.
    pub fn descriptor(&self) -> SubsystemDescriptor<'_> {
        SubsystemDescriptor::new(self.kind, &self.store, self.is_enabled())
    }
}

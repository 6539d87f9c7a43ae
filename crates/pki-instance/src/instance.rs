//! Instance handles and loaded instances.
//!
//! An [`InstanceHandle`] names an instance and knows where it lives; it can
//! check existence and create or remove the on-disk layout. Only
//! [`InstanceHandle::load`] yields an [`Instance`], so ports and subsystems are
//! never read from an instance that has not been loaded.

use std::fs;
use std::str::FromStr;

use pki_config::InstancePaths;
use strum::{AsRefStr, Display, EnumString};
use tracing::{debug, info};

use crate::error::InstanceError;
use crate::kind::SubsystemKind;
use crate::network::NetworkConfig;
use crate::store::ConfigStore;
use crate::subsystem::Subsystem;

const USER_KEY: &str = "instance.user";
const GROUP_KEY: &str = "instance.group";
const TYPE_KEY: &str = "instance.type";

/// Account owning instance processes unless overridden.
pub const DEFAULT_INSTANCE_USER: &str = "pkiuser";
/// Group owning instance processes unless overridden.
pub const DEFAULT_INSTANCE_GROUP: &str = "pkiuser";

/// How the server process is managed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum InstanceType {
    /// Plain server process.
    #[default]
    Standard,
    /// Server process managed by a watchdog.
    Supervised,
}

/// Ownership and management settings recorded in `server.cfg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSettings {
    pub user: String,
    pub group: String,
    pub instance_type: InstanceType,
}

impl Default for InstanceSettings {
    fn default() -> Self {
        Self {
            user: DEFAULT_INSTANCE_USER.to_owned(),
            group: DEFAULT_INSTANCE_GROUP.to_owned(),
            instance_type: InstanceType::Standard,
        }
    }
}

/// Named reference to an instance that may or may not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceHandle {
    paths: InstancePaths,
}

impl InstanceHandle {
    /// Wraps resolved paths.
    pub fn new(paths: InstancePaths) -> Self {
        Self { paths }
    }

    /// Instance identifier.
    pub fn name(&self) -> &str {
        self.paths.name()
    }

    /// On-disk layout.
    pub fn paths(&self) -> &InstancePaths {
        &self.paths
    }

    /// Whether the instance has persisted state.
    pub fn exists(&self) -> bool {
        self.paths.server_config_path().is_file()
    }

    /// Creates the instance layout and writes `server.cfg`.
    ///
    /// Existing stores are overwritten; callers decide whether that is
    /// allowed.
    pub fn create(&self, settings: &InstanceSettings) -> Result<Instance, InstanceError> {
        for dir in [
            self.paths.conf_dir(),
            self.paths.deployment_dir(),
            self.paths.logs_dir(),
            self.paths.run_dir(),
        ] {
            fs::create_dir_all(dir).map_err(|source| InstanceError::layout(dir, source))?;
        }

        let mut store = ConfigStore::load_or_empty(self.paths.server_config_path())?;
        store.set(USER_KEY, settings.user.as_str())?;
        store.set(GROUP_KEY, settings.group.as_str())?;
        store.set(TYPE_KEY, settings.instance_type.as_ref())?;
        let network = NetworkConfig::initial();
        network.write_to(&mut store)?;
        store.persist()?;

        info!(
            target: "pki_instance::instance",
            instance = self.name(),
            user = settings.user.as_str(),
            "created instance layout"
        );
        self.load()
    }

    /// Deletes the instance directory. Missing directories are ignored.
    pub fn remove(&self) -> Result<(), InstanceError> {
        let base = self.paths.base_dir();
        match fs::remove_dir_all(base) {
            Ok(()) => {
                info!(
                    target: "pki_instance::instance",
                    instance = self.name(),
                    "removed instance"
                );
                Ok(())
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(InstanceError::layout(base, source)),
        }
    }

    /// Loads settings, ports, and installed subsystems.
    pub fn load(&self) -> Result<Instance, InstanceError> {
        if !self.exists() {
            return Err(InstanceError::NotFound {
                name: self.name().to_owned(),
            });
        }
        let store = ConfigStore::load(self.paths.server_config_path())?;
        let settings = read_settings(&store)?;
        let network = NetworkConfig::from_store(&store)?;

        let mut subsystems = Vec::new();
        for kind in SubsystemKind::ALL {
            if let Some(subsystem) = Subsystem::load(&self.paths, kind)? {
                subsystems.push(subsystem);
            }
        }
        debug!(
            target: "pki_instance::instance",
            instance = self.name(),
            subsystems = subsystems.len(),
            "loaded instance"
        );

        Ok(Instance {
            paths: self.paths.clone(),
            settings,
            network,
            subsystems,
        })
    }
}

fn read_settings(store: &ConfigStore) -> Result<InstanceSettings, InstanceError> {
    let defaults = InstanceSettings::default();
    let instance_type = match store.get(TYPE_KEY) {
        Some(value) => InstanceType::from_str(value.trim()).map_err(|_| {
            InstanceError::InvalidType {
                value: value.to_owned(),
            }
        })?,
        None => defaults.instance_type,
    };
    Ok(InstanceSettings {
        user: store.get(USER_KEY).map_or(defaults.user, str::to_owned),
        group: store.get(GROUP_KEY).map_or(defaults.group, str::to_owned),
        instance_type,
    })
}

/// Fully loaded instance.
#[derive(Debug, Clone)]
pub struct Instance {
    paths: InstancePaths,
    settings: InstanceSettings,
    network: NetworkConfig,
    subsystems: Vec<Subsystem>,
}

impl Instance {
    /// Instance identifier.
    pub fn name(&self) -> &str {
        self.paths.name()
    }

    /// On-disk layout.
    pub fn paths(&self) -> &InstancePaths {
        &self.paths
    }

    /// Ownership and management settings.
    pub fn settings(&self) -> &InstanceSettings {
        &self.settings
    }

    /// Configured ports.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Whether a watchdog manages the server process.
    pub fn watchdog_enabled(&self) -> bool {
        self.settings.instance_type == InstanceType::Supervised
    }

    /// Installed subsystems in report order.
    pub fn subsystems(&self) -> &[Subsystem] {
        &self.subsystems
    }

    /// Looks up an installed subsystem.
    pub fn subsystem(&self, kind: SubsystemKind) -> Option<&Subsystem> {
        self.subsystems.iter().find(|subsystem| subsystem.kind() == kind)
    }

    /// Looks up an installed subsystem for modification.
    pub fn subsystem_mut(&mut self, kind: SubsystemKind) -> Option<&mut Subsystem> {
        self.subsystems
            .iter_mut()
            .find(|subsystem| subsystem.kind() == kind)
    }
}

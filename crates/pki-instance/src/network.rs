//! Server network configuration read from `server.cfg`.

use crate::error::InstanceError;
use crate::store::{ConfigStore, StoreError};

pub(crate) const UNSECURE_PORT_KEY: &str = "http.port";
pub(crate) const SECURE_PORT_KEY: &str = "https.port";
pub(crate) const AJP_PORT_KEY: &str = "ajp.port";
pub(crate) const SERVICE_PORT_KEY: &str = "server.port";

/// Plain HTTP port written by `create`.
pub const DEFAULT_UNSECURE_PORT: u16 = 8080;
/// HTTPS port written by `create`.
pub const DEFAULT_SECURE_PORT: u16 = 8443;
/// Shutdown/service port written by `create`.
pub const DEFAULT_SERVICE_PORT: u16 = 8005;

/// Ports exposed by an instance. A port is configured only when present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkConfig {
    pub unsecure_port: Option<u16>,
    pub secure_port: Option<u16>,
    pub ajp_port: Option<u16>,
    pub service_port: Option<u16>,
}

impl NetworkConfig {
    /// Ports a freshly created instance listens on.
    pub fn initial() -> Self {
        Self {
            unsecure_port: Some(DEFAULT_UNSECURE_PORT),
            secure_port: Some(DEFAULT_SECURE_PORT),
            ajp_port: None,
            service_port: Some(DEFAULT_SERVICE_PORT),
        }
    }

    /// Reads the ports recorded in `store`.
    pub fn from_store(store: &ConfigStore) -> Result<Self, InstanceError> {
        Ok(Self {
            unsecure_port: read_port(store, UNSECURE_PORT_KEY)?,
            secure_port: read_port(store, SECURE_PORT_KEY)?,
            ajp_port: read_port(store, AJP_PORT_KEY)?,
            service_port: read_port(store, SERVICE_PORT_KEY)?,
        })
    }

    /// Records the configured ports in `store`, removing unset ones.
    pub fn write_to(&self, store: &mut ConfigStore) -> Result<(), StoreError> {
        for (key, port) in [
            (UNSECURE_PORT_KEY, self.unsecure_port),
            (SECURE_PORT_KEY, self.secure_port),
            (AJP_PORT_KEY, self.ajp_port),
            (SERVICE_PORT_KEY, self.service_port),
        ] {
            match port {
                Some(port) => store.set(key, port.to_string())?,
                None => {
                    store.unset(key);
                }
            }
        }
        Ok(())
    }

    /// Port checked to decide whether the instance is active.
    ///
    /// Prefers the secure port, then the unsecure port, then the service port.
    pub fn readiness_port(&self) -> Option<u16> {
        self.secure_port
            .or(self.unsecure_port)
            .or(self.service_port)
    }
}

fn read_port(store: &ConfigStore, key: &str) -> Result<Option<u16>, InstanceError> {
    let Some(raw) = store.get(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u16>()
        .map(Some)
        .map_err(|_| InstanceError::InvalidPort {
            key: key.to_owned(),
            value: raw.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn store(entries: &[(&str, &str)]) -> ConfigStore {
        let mut store = ConfigStore::empty("/unused/server.cfg");
        for (key, value) in entries {
            store.set(*key, *value).expect("valid entry");
        }
        store
    }

    #[test]
    fn absent_ports_are_not_assumed() {
        let config = NetworkConfig::from_store(&store(&[])).expect("config");
        assert_eq!(config, NetworkConfig::default());
        assert_eq!(config.readiness_port(), None);
    }

    #[rstest]
    #[case::secure_first(&[("https.port", "8443"), ("http.port", "8080")], Some(8443))]
    #[case::unsecure_next(&[("http.port", "8080"), ("server.port", "8005")], Some(8080))]
    #[case::service_last(&[("server.port", "8005"), ("ajp.port", "8009")], Some(8005))]
    #[case::ajp_never(&[("ajp.port", "8009")], None)]
    fn readiness_port_precedence(
        #[case] entries: &[(&str, &str)],
        #[case] expected: Option<u16>,
    ) {
        let config = NetworkConfig::from_store(&store(entries)).expect("config");
        assert_eq!(config.readiness_port(), expected);
    }

    #[test]
    fn rejects_non_numeric_port() {
        let error = NetworkConfig::from_store(&store(&[("http.port", "eighty")]))
            .expect_err("invalid port");
        assert!(matches!(error, InstanceError::InvalidPort { ref key, .. } if key == "http.port"));
    }

    #[test]
    fn write_to_removes_unset_ports() {
        let mut target = store(&[("ajp.port", "8009")]);
        NetworkConfig::initial().write_to(&mut target).expect("write ports");
        assert_eq!(target.get("ajp.port"), None);
        assert_eq!(target.get("https.port"), Some("8443"));
        assert_eq!(
            NetworkConfig::from_store(&target).expect("config"),
            NetworkConfig::initial()
        );
    }
}

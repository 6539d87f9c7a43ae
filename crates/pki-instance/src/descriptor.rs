//! Read-only display facts derived from a subsystem's configuration store.
//!
//! The displayed type is computed by an ordered rule table: the first rule
//! that matches wins, and the security-domain suffix is applied on top of
//! whichever rule matched. Keeping the rules as data makes precedence
//! explicit and lets each rule be tested on its own.

use crate::kind::SubsystemKind;
use crate::store::ConfigStore;

const SELECT_KEY: &str = "subsystem.select";
const HIERARCHY_KEY: &str = "hierarchy.select";
const DOMAIN_SELECT_KEY: &str = "securitydomain.select";
const DOMAIN_NAME_KEY: &str = "securitydomain.name";
const DOMAIN_HOST_KEY: &str = "securitydomain.host";
const DOMAIN_ADMIN_PORT_KEY: &str = "securitydomain.httpsadminport";

const SECURITY_DOMAIN_SUFFIX: &str = " (Security Domain)";

type DisplayRule = fn(SubsystemKind, &ConfigStore) -> Option<String>;

/// Display-type rules in precedence order.
const DISPLAY_RULES: &[DisplayRule] = &[clone_rule, standalone_rule, hierarchy_rule];

fn clone_rule(kind: SubsystemKind, store: &ConfigStore) -> Option<String> {
    (store.get(SELECT_KEY) == Some("Clone")).then(|| format!("{} Clone", kind.label()))
}

fn standalone_rule(kind: SubsystemKind, store: &ConfigStore) -> Option<String> {
    let key = kind.standalone_key()?;
    (store.get(key) == Some("true")).then(|| format!("{} (Standalone)", kind.label()))
}

fn hierarchy_rule(kind: SubsystemKind, store: &ConfigStore) -> Option<String> {
    if kind != SubsystemKind::Ca {
        return None;
    }
    store
        .get(HIERARCHY_KEY)
        .map(|hierarchy| format!("{hierarchy} {}", kind.label()))
}

/// Security-domain linkage of a subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityDomain {
    /// Domain name; empty when unset.
    pub name: String,
    /// Registration endpoint, `https://<host>:<admin port>`.
    pub registration_url: String,
}

/// Borrowed view deriving report facts from one subsystem.
#[derive(Debug, Clone, Copy)]
pub struct SubsystemDescriptor<'a> {
    kind: SubsystemKind,
    store: &'a ConfigStore,
    enabled: bool,
}

impl<'a> SubsystemDescriptor<'a> {
    /// Wraps `store`; `enabled` reflects the deployment descriptor.
    pub fn new(kind: SubsystemKind, store: &'a ConfigStore, enabled: bool) -> Self {
        Self {
            kind,
            store,
            enabled,
        }
    }

    /// Whether the subsystem is deployed.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Human-readable type, e.g. `"Root CA (Security Domain)"`.
    pub fn display_type(&self) -> String {
        let mut display = DISPLAY_RULES
            .iter()
            .find_map(|rule| rule(self.kind, self.store))
            .unwrap_or_else(|| self.kind.label().to_owned());
        if self.store.get(DOMAIN_SELECT_KEY) == Some("new") {
            display.push_str(SECURITY_DOMAIN_SUFFIX);
        }
        display
    }

    /// Security-domain name and registration URL.
    pub fn security_domain(&self) -> SecurityDomain {
        let host = self.store.get(DOMAIN_HOST_KEY).unwrap_or_default();
        let port = self.store.get(DOMAIN_ADMIN_PORT_KEY).unwrap_or_default();
        SecurityDomain {
            name: self.store.get(DOMAIN_NAME_KEY).unwrap_or_default().to_owned(),
            registration_url: format!("https://{host}:{port}"),
        }
    }
}

//! Status aggregation for one instance.

mod endpoints;
mod models;
mod render;

use pki_instance::Instance;

pub(crate) use render::render_report;

use self::endpoints::endpoint_lines;
use self::models::{StatusReport, SubsystemReport};

const FALLBACK_HOSTNAME: &str = "localhost";

/// Builds the report for a loaded instance.
///
/// Subsystems appear in the fixed kind order in which the instance loaded
/// them. `hostname` is resolved once by the caller and shared by every URL.
pub(crate) fn build_report(instance: &Instance, active: bool, hostname: &str) -> StatusReport {
    let network = instance.network();
    let subsystems = instance
        .subsystems()
        .iter()
        .map(|subsystem| {
            let descriptor = subsystem.descriptor();
            let domain = descriptor.security_domain();
            let enabled = descriptor.enabled();
            SubsystemReport {
                kind: subsystem.kind().label(),
                display_type: descriptor.display_type(),
                sd_name: domain.name,
                sd_registration_url: domain.registration_url,
                enabled,
                endpoints: if enabled {
                    endpoint_lines(subsystem.kind(), network, hostname)
                } else {
                    Vec::new()
                },
            }
        })
        .collect();

    StatusReport {
        instance_id: instance.name().to_owned(),
        active,
        watchdog_enabled: instance.watchdog_enabled(),
        unsecure_port: network.unsecure_port,
        secure_port: network.secure_port,
        ajp_port: network.ajp_port,
        service_port: network.service_port,
        subsystems,
    }
}

/// Fully qualified host name used in endpoint URLs.
#[cfg(unix)]
pub(crate) fn local_hostname() -> String {
    nix::unistd::gethostname()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| String::from(FALLBACK_HOSTNAME))
}

#[cfg(not(unix))]
pub(crate) fn local_hostname() -> String {
    String::from(FALLBACK_HOSTNAME)
}

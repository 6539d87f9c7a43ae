//! Public URL tables per subsystem kind.

use pki_instance::{NetworkConfig, SubsystemKind};

use super::models::EndpointLine;

const OCSP_REQUEST_BLOB: &str = "<ocsp request blob>";

#[derive(Debug, Clone, Copy)]
enum Scheme {
    Unsecure,
    Secure,
}

#[derive(Debug, Clone, Copy)]
struct EndpointTemplate {
    label: &'static str,
    scheme: Scheme,
    path: &'static str,
}

const fn unsecure(label: &'static str, path: &'static str) -> EndpointTemplate {
    EndpointTemplate {
        label,
        scheme: Scheme::Unsecure,
        path,
    }
}

const fn secure(label: &'static str, path: &'static str) -> EndpointTemplate {
    EndpointTemplate {
        label,
        scheme: Scheme::Secure,
        path,
    }
}

const CA: &[EndpointTemplate] = &[
    unsecure("Unsecure URL", "/ca/ee/ca"),
    secure("Secure Agent URL", "/ca/agent/ca"),
    secure("Secure EE URL", "/ca/ee/ca"),
    secure("Secure Admin URL", "/ca/services"),
    secure("PKI Console URL", "/ca"),
];

const KRA: &[EndpointTemplate] = &[
    secure("Secure Agent URL", "/kra/agent/kra"),
    secure("Secure Admin URL", "/kra/services"),
    secure("PKI Console URL", "/kra"),
];

const OCSP: &[EndpointTemplate] = &[
    unsecure("Unsecure URL", "/ocsp/ee/ocsp/"),
    secure("Secure Agent URL", "/ocsp/agent/ocsp"),
    secure("Secure EE URL", "/ocsp/ee/ocsp/"),
    secure("Secure Admin URL", "/ocsp/services"),
    secure("PKI Console URL", "/ocsp"),
];

const TKS: &[EndpointTemplate] = &[
    secure("Secure Agent URL", "/tks/agent/tks"),
    secure("Secure Admin URL", "/tks/services"),
    secure("PKI Console URL", "/tks"),
];

const TPS: &[EndpointTemplate] = &[
    unsecure("Unsecure URL", "/tps"),
    unsecure("Unsecure PHONE HOME", "/tps/phoneHome"),
    secure("Secure URL", "/tps"),
    secure("Secure PHONE HOME", "/tps/phoneHome"),
];

const ACME: &[EndpointTemplate] = &[
    unsecure("Unsecure URL", "/acme"),
    secure("Secure URL", "/acme"),
];

const EST: &[EndpointTemplate] = &[secure("Secure URL", "/.well-known/est")];

fn table(kind: SubsystemKind) -> &'static [EndpointTemplate] {
    match kind {
        SubsystemKind::Ca => CA,
        SubsystemKind::Kra => KRA,
        SubsystemKind::Ocsp => OCSP,
        SubsystemKind::Tks => TKS,
        SubsystemKind::Tps => TPS,
        SubsystemKind::Acme => ACME,
        SubsystemKind::Est => EST,
    }
}

/// URLs for an enabled subsystem; lines whose port is unset are omitted.
pub(crate) fn endpoint_lines(
    kind: SubsystemKind,
    network: &NetworkConfig,
    hostname: &str,
) -> Vec<EndpointLine> {
    table(kind)
        .iter()
        .filter_map(|template| {
            let (scheme, port) = match template.scheme {
                Scheme::Unsecure => ("http", network.unsecure_port?),
                Scheme::Secure => ("https", network.secure_port?),
            };
            let blob = if template.path.ends_with('/') {
                OCSP_REQUEST_BLOB
            } else {
                ""
            };
            Some(EndpointLine {
                label: template.label,
                url: format!("{scheme}://{hostname}:{port}{}{blob}", template.path),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(unsecure: Option<u16>, secure: Option<u16>) -> NetworkConfig {
        NetworkConfig {
            unsecure_port: unsecure,
            secure_port: secure,
            ..NetworkConfig::default()
        }
    }

    fn render(lines: &[EndpointLine]) -> Vec<String> {
        lines
            .iter()
            .map(|line| format!("{}: {}", line.label, line.url))
            .collect()
    }

    #[test]
    fn ca_lists_every_url() {
        let lines = endpoint_lines(SubsystemKind::Ca, &network(Some(8080), Some(8443)), "h");
        assert_eq!(
            render(&lines),
            [
                "Unsecure URL: http://h:8080/ca/ee/ca",
                "Secure Agent URL: https://h:8443/ca/agent/ca",
                "Secure EE URL: https://h:8443/ca/ee/ca",
                "Secure Admin URL: https://h:8443/ca/services",
                "PKI Console URL: https://h:8443/ca",
            ]
        );
    }

    #[test]
    fn ocsp_urls_end_with_request_placeholder() {
        let lines = endpoint_lines(SubsystemKind::Ocsp, &network(Some(80), Some(443)), "h");
        let first = lines.first().expect("unsecure line");
        assert_eq!(first.url, "http://h:80/ocsp/ee/ocsp/<ocsp request blob>");
        assert!(
            lines
                .iter()
                .any(|line| line.url == "https://h:443/ocsp/ee/ocsp/<ocsp request blob>")
        );
    }

    #[test]
    fn lines_without_a_configured_port_are_omitted() {
        let lines = endpoint_lines(SubsystemKind::Tps, &network(None, Some(8443)), "h");
        assert_eq!(
            render(&lines),
            ["Secure URL: https://h:8443/tps", "Secure PHONE HOME: https://h:8443/tps/phoneHome"]
        );
        assert!(endpoint_lines(SubsystemKind::Est, &network(Some(8080), None), "h").is_empty());
    }
}

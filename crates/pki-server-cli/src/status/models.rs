//! Serialisable status report model.

use serde::Serialize;

/// Composite status of one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct StatusReport {
    pub instance_id: String,
    pub active: bool,
    pub watchdog_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsecure_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ajp_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_port: Option<u16>,
    pub subsystems: Vec<SubsystemReport>,
}

/// Status of one installed subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct SubsystemReport {
    pub kind: &'static str,
    #[serde(rename = "type")]
    pub display_type: String,
    pub sd_name: String,
    pub sd_registration_url: String,
    pub enabled: bool,
    pub endpoints: Vec<EndpointLine>,
}

/// One public URL of an enabled subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct EndpointLine {
    pub label: &'static str,
    pub url: String,
}

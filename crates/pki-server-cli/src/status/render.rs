//! Human and JSON renderings of a status report.

use std::io::Write;

use super::models::{StatusReport, SubsystemReport};
use crate::cli::ResolvedOutputFormat;
use crate::lifecycle::LifecycleError;

/// Writes `report` in the requested format.
pub(crate) fn render_report(
    report: &StatusReport,
    format: ResolvedOutputFormat,
    writer: &mut impl Write,
) -> Result<(), LifecycleError> {
    let rendered = match format {
        ResolvedOutputFormat::Human => render_human(report),
        ResolvedOutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(report)
                .map_err(LifecycleError::SerialiseReport)?;
            json.push('\n');
            json
        }
    };
    writer
        .write_all(rendered.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(LifecycleError::Io)
}

fn render_human(report: &StatusReport) -> String {
    let mut lines = vec![
        format!("  Instance ID: {}", report.instance_id),
        format!("  Active: {}", report.active),
        format!("  Watchdog Enabled: {}", report.watchdog_enabled),
    ];
    let ports = [
        ("Unsecure Port", report.unsecure_port),
        ("Secure Port", report.secure_port),
        ("AJP Port", report.ajp_port),
        ("Service Port", report.service_port),
    ];
    for (label, port) in ports {
        if let Some(port) = port {
            lines.push(format!("  {label}: {port}"));
        }
    }
    for subsystem in &report.subsystems {
        lines.push(String::new());
        push_subsystem(&mut lines, subsystem);
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn push_subsystem(lines: &mut Vec<String>, subsystem: &SubsystemReport) {
    lines.push(format!("  {} Subsystem:", subsystem.kind));
    let fields = [
        ("Type:", subsystem.display_type.clone()),
        ("SD Name:", subsystem.sd_name.clone()),
        ("SD Registration URL:", subsystem.sd_registration_url.clone()),
        ("Enabled:", subsystem.enabled.to_string()),
    ];
    for (label, value) in fields {
        lines.push(format!("    {label:<21}{value}"));
    }
    if subsystem.enabled {
        for endpoint in &subsystem.endpoints {
            let label = format!("{}:", endpoint.label);
            lines.push(format!("    {label:<21}{}", endpoint.url));
        }
    }
}

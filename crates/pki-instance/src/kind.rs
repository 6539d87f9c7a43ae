//! Fixed set of subsystem kinds an instance can host.

use strum::{AsRefStr, Display, EnumString};

/// Identity of a subsystem within an instance.
///
/// Declaration order is the order used by status reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, AsRefStr, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SubsystemKind {
    /// Certificate authority.
    Ca,
    /// Key recovery authority.
    Kra,
    /// Certificate validation responder.
    Ocsp,
    /// Token key service.
    Tks,
    /// Token processing system.
    Tps,
    /// Automated certificate enrollment.
    Acme,
    /// Enrollment over secure transport.
    Est,
}

impl SubsystemKind {
    /// Every kind in report order.
    pub const ALL: [Self; 7] = [
        Self::Ca,
        Self::Kra,
        Self::Ocsp,
        Self::Tks,
        Self::Tps,
        Self::Acme,
        Self::Est,
    ];

    /// Directory and command name, e.g. `ca`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ca => "ca",
            Self::Kra => "kra",
            Self::Ocsp => "ocsp",
            Self::Tks => "tks",
            Self::Tps => "tps",
            Self::Acme => "acme",
            Self::Est => "est",
        }
    }

    /// Upper-case label used in reports, e.g. `CA`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Ca => "CA",
            Self::Kra => "KRA",
            Self::Ocsp => "OCSP",
            Self::Tks => "TKS",
            Self::Tps => "TPS",
            Self::Acme => "ACME",
            Self::Est => "EST",
        }
    }

    /// Key whose `"true"` value marks a standalone deployment.
    pub(crate) fn standalone_key(self) -> Option<&'static str> {
        match self {
            Self::Kra => Some("kra.standalone"),
            Self::Ocsp => Some("ocsp.standalone"),
            _ => None,
        }
    }
}

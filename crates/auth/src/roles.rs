use serde::{Deserialize, Serialize};

/// Role identifier as granted by the upstream identity service.
///
/// This is a closed enumeration: the gateway only routes on roles it knows.
/// Unknown role strings carried by a session are preserved as-is but ignored
/// for routing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleKey {
    #[serde(rename = "ROLE_SUPERADMIN")]
    Superadmin,
    #[serde(rename = "ROLE_PARTNERUSER")]
    PartnerUser,
    #[serde(rename = "ROLE_TRADITIONALBACKOFFICE")]
    TraditionalBackoffice,
    #[serde(rename = "ROLE_TRADITIONALBACKOFFICE_RESEARCH")]
    TraditionalBackofficeResearch,
    #[serde(rename = "ROLE_TRADITIONALBACKOFFICE_REQUEST_LETTER")]
    TraditionalBackofficeRequestLetter,
}

impl RoleKey {
    /// Wire representation, e.g. `"ROLE_PARTNERUSER"`.
    pub fn as_str(&self) -> &'static str {
        self.mapping().key
    }

    /// Static display/routing metadata for this role.
    pub fn mapping(&self) -> &'static RoleMapping {
        match self {
            RoleKey::Superadmin => &ROLE_MAPPINGS[0],
            RoleKey::PartnerUser => &ROLE_MAPPINGS[1],
            RoleKey::TraditionalBackoffice => &ROLE_MAPPINGS[2],
            RoleKey::TraditionalBackofficeResearch => &ROLE_MAPPINGS[3],
            RoleKey::TraditionalBackofficeRequestLetter => &ROLE_MAPPINGS[4],
        }
    }

    /// Default landing path for this role's dashboard.
    pub fn path(&self) -> &'static str {
        self.mapping().path
    }
}

impl core::fmt::Display for RoleKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static mapping from role identifier to display metadata and a default
/// landing path. Immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleMapping {
    pub key: &'static str,
    pub display_name: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

/// The role registry. Several backoffice roles share one dashboard namespace.
pub const ROLE_MAPPINGS: [RoleMapping; 5] = [
    RoleMapping {
        key: "ROLE_SUPERADMIN",
        display_name: "Super Admin",
        path: "/dashboard/superadmin",
        description: "Full system administration access",
    },
    RoleMapping {
        key: "ROLE_PARTNERUSER",
        display_name: "Partner User",
        path: "/dashboard/partner",
        description: "Partner portal access",
    },
    RoleMapping {
        key: "ROLE_TRADITIONALBACKOFFICE",
        display_name: "Traditional Backoffice",
        path: "/dashboard/traditional-backoffice",
        description: "Backoffice case processing",
    },
    RoleMapping {
        key: "ROLE_TRADITIONALBACKOFFICE_RESEARCH",
        display_name: "Backoffice Research",
        path: "/dashboard/traditional-backoffice",
        description: "Backoffice research queue",
    },
    RoleMapping {
        key: "ROLE_TRADITIONALBACKOFFICE_REQUEST_LETTER",
        display_name: "Backoffice Request Letter",
        path: "/dashboard/traditional-backoffice",
        description: "Backoffice request-letter queue",
    },
];

const ALL_KEYS: [RoleKey; 5] = [
    RoleKey::Superadmin,
    RoleKey::PartnerUser,
    RoleKey::TraditionalBackoffice,
    RoleKey::TraditionalBackofficeResearch,
    RoleKey::TraditionalBackofficeRequestLetter,
];

/// Parse a wire role string into a known role key.
pub fn parse_role(role: &str) -> Option<RoleKey> {
    ALL_KEYS.iter().copied().find(|k| k.as_str() == role)
}

/// Whether the granted role strings contain `required`.
pub fn has_role(roles: &[String], required: RoleKey) -> bool {
    roles.iter().any(|r| r == required.as_str())
}

/// Intersection of granted role strings with the registry, in grant order.
///
/// Unknown strings are dropped here (routing ignores them) but remain in the
/// session untouched.
pub fn available_roles(roles: &[String]) -> Vec<RoleKey> {
    roles.iter().filter_map(|r| parse_role(r)).collect()
}

use serde::{Deserialize, Serialize};

use crate::Role;

/// An application surface with its own admission policy.
///
/// A session is always established *for* a surface; a role the surface does
/// not permit never reaches the authenticated state there.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// Buyer/seller marketplace.
    Storefront,
    /// Operator console.
    Admin,
}

impl Surface {
    /// Whether `role` may hold an authenticated session on this surface.
    ///
    /// # Invariants
    /// - The admin surface admits exactly `Role::Admin`.
    /// - Unlisted combinations are rejections, never fallthroughs.
    pub fn permits(self, role: Role) -> bool {
        match self {
            Surface::Admin => matches!(role, Role::Admin),
            Surface::Storefront => matches!(role, Role::Buyer | Role::Seller | Role::Both),
        }
    }
}

impl core::fmt::Display for Surface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Surface::Storefront => f.write_str("storefront"),
            Surface::Admin => f.write_str("admin"),
        }
    }
}

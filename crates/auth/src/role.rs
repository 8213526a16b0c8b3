use serde::{Deserialize, Serialize};

/// Account role.
///
/// This is a closed set: policy checks match on it exhaustively, so adding a
/// variant forces every check site to take a position on it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Purchases listings.
    Buyer,
    /// Publishes listings.
    Seller,
    /// Buyer and seller capabilities combined.
    Both,
    /// Marketplace operator. Provisioned out of band, never self-assigned.
    Admin,
}

impl Role {
    /// Roles a user may pick for themselves at registration.
    pub fn assignable_at_registration(self) -> bool {
        !matches!(self, Role::Admin)
    }

    /// Whether this role may publish and manage listings.
    pub fn can_sell(self) -> bool {
        matches!(self, Role::Seller | Role::Both)
    }

    /// Whether this role may place orders.
    pub fn can_buy(self) -> bool {
        matches!(self, Role::Buyer | Role::Both)
    }

    /// Wire form (`BUYER`, `SELLER`, `BOTH`, `ADMIN`).
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Buyer => "BUYER",
            Role::Seller => "SELLER",
            Role::Both => "BOTH",
            Role::Admin => "ADMIN",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

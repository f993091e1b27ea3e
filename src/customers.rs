//! Customers

/// Customer profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerProfile {
    /// Customer identifier
    pub id: String,

    /// Loyalty tier, compared case-sensitively against discount tier lists
    pub tier: String,
}

impl CustomerProfile {
    /// Create a new customer profile.
    pub fn new(id: impl Into<String>, tier: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tier: tier.into(),
        }
    }
}

use serde::Serialize;

use crate::domain::value_objects::enums::plan_ids::PlanId;

/// A plan tier: credit allotment, price and validity window. The catalog is
/// a fixed in-code table; there is no mutation path and no storage behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanTier {
    pub id: PlanId,
    pub name: &'static str,
    pub credit_allotment: i64,
    pub price_minor: i32,
    pub duration_days: i64,
    pub features: &'static [&'static str],
}

/// Tiers ordered by ascending price. The position in this table is the
/// upgrade hierarchy rank (free < flash < pro).
const PLAN_CATALOG: [PlanTier; 3] = [
    PlanTier {
        id: PlanId::Free,
        name: "Free",
        credit_allotment: 10,
        price_minor: 0,
        duration_days: 30,
        features: &["10 messages per month", "Basic support", "Limited access"],
    },
    PlanTier {
        id: PlanId::Flash,
        name: "Flash",
        credit_allotment: 100,
        price_minor: 1500,
        duration_days: 30,
        features: &[
            "100 messages per month",
            "Priority support",
            "Full access",
            "Conversation history",
        ],
    },
    PlanTier {
        id: PlanId::Pro,
        name: "Pro",
        credit_allotment: 500,
        price_minor: 4500,
        duration_days: 30,
        features: &[
            "500 messages per month",
            "24/7 support",
            "Unlimited access",
            "Full history",
            "Advanced analytics",
            "Custom API",
        ],
    },
];

pub struct PlanCatalog;

impl PlanCatalog {
    pub fn all() -> &'static [PlanTier] {
        &PLAN_CATALOG
    }

    pub fn find_by_id(id: PlanId) -> &'static PlanTier {
        match id {
            PlanId::Free => &PLAN_CATALOG[0],
            PlanId::Flash => &PLAN_CATALOG[1],
            PlanId::Pro => &PLAN_CATALOG[2],
        }
    }

    /// Resolves a wire-format plan id. Unknown ids resolve to nothing, which
    /// is how an upgrade to a plan that does not exist fails.
    pub fn resolve(id: &str) -> Option<&'static PlanTier> {
        PlanId::from_str(id).map(Self::find_by_id)
    }

    pub fn free() -> &'static PlanTier {
        &PLAN_CATALOG[0]
    }

    /// Rank in the upgrade hierarchy, derived from ascending price order.
    /// Used for client-side upgrade/downgrade decisioning only; nothing in
    /// the engine blocks a downgrade.
    pub fn hierarchy_rank(id: PlanId) -> usize {
        PLAN_CATALOG
            .iter()
            .position(|tier| tier.id == id)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanTierDto {
    pub id: PlanId,
    pub name: String,
    pub credit_allotment: i64,
    pub price_minor: i32,
    pub duration_days: i64,
    pub features: Vec<String>,
}

impl From<&PlanTier> for PlanTierDto {
    fn from(tier: &PlanTier) -> Self {
        Self {
            id: tier.id,
            name: tier.name.to_string(),
            credit_allotment: tier.credit_allotment,
            price_minor: tier.price_minor,
            duration_days: tier.duration_days,
            features: tier.features.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_free_tier_and_it_costs_nothing() {
        let free_tiers: Vec<_> = PlanCatalog::all()
            .iter()
            .filter(|tier| tier.id == PlanId::Free)
            .collect();

        assert_eq!(free_tiers.len(), 1);
        assert_eq!(free_tiers[0].price_minor, 0);
    }

    #[test]
    fn tiers_are_ordered_by_ascending_price() {
        let prices: Vec<i32> = PlanCatalog::all().iter().map(|t| t.price_minor).collect();
        let mut sorted = prices.clone();
        sorted.sort();

        assert_eq!(prices, sorted);
    }

    #[test]
    fn hierarchy_rank_follows_price_order() {
        assert!(PlanCatalog::hierarchy_rank(PlanId::Free) < PlanCatalog::hierarchy_rank(PlanId::Flash));
        assert!(PlanCatalog::hierarchy_rank(PlanId::Flash) < PlanCatalog::hierarchy_rank(PlanId::Pro));
    }

    #[test]
    fn resolve_rejects_unknown_plan_ids() {
        assert!(PlanCatalog::resolve("enterprise").is_none());
        assert_eq!(PlanCatalog::resolve("pro").map(|t| t.id), Some(PlanId::Pro));
    }

    #[test]
    fn durations_are_positive() {
        assert!(PlanCatalog::all().iter().all(|t| t.duration_days > 0));
    }
}

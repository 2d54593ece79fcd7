//! Dashboard aggregates computed from a user's lots.

use serde::Serialize;

use super::lot::{Lot, LotStatus};

/// Cumulative environmental and commercial impact of a set of lots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SustainabilityImpact {
    pub total_carbon_saved: f64,
    pub total_emissions_reduced: f64,
    pub total_water_saved: f64,
    pub lots_created: usize,
    /// Sum of price x quantity over sold lots.
    pub revenue: f64,
}

impl SustainabilityImpact {
    pub fn from_lots<'a>(lots: impl IntoIterator<Item = &'a Lot>) -> Self {
        lots.into_iter().fold(Self::default(), |mut acc, lot| {
            acc.total_carbon_saved += lot.sustainability.carbon_saved;
            acc.total_emissions_reduced += lot.sustainability.emissions_reduced;
            acc.total_water_saved += lot.sustainability.water_saved;
            acc.lots_created += 1;
            if lot.status == LotStatus::Sold {
                acc.revenue += lot.value();
            }
            acc
        })
    }

    /// Add revenue from accepted offers (buyer dashboards).
    #[must_use]
    pub fn with_revenue(mut self, revenue: f64) -> Self {
        self.revenue += revenue;
        self
    }
}

/// Quick stats shown above the lot list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotSummary {
    pub available: usize,
    pub sold: usize,
    /// Sum of price x quantity over every lot regardless of status.
    pub total_value: f64,
}

impl LotSummary {
    pub fn from_lots<'a>(lots: impl IntoIterator<Item = &'a Lot>) -> Self {
        lots.into_iter().fold(Self::default(), |mut acc, lot| {
            match lot.status {
                LotStatus::Available => acc.available += 1,
                LotStatus::Sold => acc.sold += 1,
                LotStatus::Reserved => {}
            }
            acc.total_value += lot.value();
            acc
        })
    }
}

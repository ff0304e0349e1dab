//! Personal impact estimates from current economic conditions.
//!
//! All amounts are annual dollars except the mortgage payments, which are
//! monthly. Negative impacts are costs.

use serde::{Deserialize, Serialize};

use crate::domain::DashboardSnapshot;
use crate::math::mortgage::monthly_payment;

/// Rate bump applied to adjustable-rate loans.
pub const ADJUSTABLE_RATE_SHOCK_PCT: f64 = 1.0;

/// Headline conditions feeding the calculator (all in percent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicConditions {
    pub inflation: f64,
    pub fed_rate: f64,
    pub mortgage_rate: f64,
    pub unemployment_rate: f64,
}

impl Default for EconomicConditions {
    fn default() -> Self {
        Self {
            inflation: 3.1,
            fed_rate: 5.5,
            mortgage_rate: 7.1,
            unemployment_rate: 3.8,
        }
    }
}

impl EconomicConditions {
    /// Overlay the dashboard snapshot onto the defaults.
    ///
    /// The CPI entry is an index level; readings above 50 are scaled down by
    /// 100 to land in percent territory. The mortgage rate is not part of the
    /// snapshot and keeps its default.
    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Self {
        let defaults = Self::default();
        let value = |id: &str| snapshot.get(id).and_then(|v| v.value).filter(|v| v.is_finite() && *v != 0.0);

        let mut inflation = value("CPIAUCSL").unwrap_or(defaults.inflation);
        if inflation > 50.0 {
            tracing::warn!(inflation, "inflation reading looks like an index level, dividing by 100");
            inflation /= 100.0;
        }

        Self {
            inflation,
            fed_rate: value("FEDFUNDS").unwrap_or(defaults.fed_rate),
            mortgage_rate: defaults.mortgage_rate,
            unemployment_rate: value("UNRATE").unwrap_or(defaults.unemployment_rate),
        }
    }

    /// Assumed savings APY: half the policy rate.
    pub fn savings_rate(&self) -> f64 {
        self.fed_rate / 2.0
    }
}

/// The user's household figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HouseholdInputs {
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
    pub mortgage_balance: f64,
    pub mortgage_term_years: u32,
    pub mortgage_rate: f64,
    pub adjustable_rate: bool,
}

impl Default for HouseholdInputs {
    fn default() -> Self {
        Self {
            income: 60_000.0,
            expenses: 48_000.0,
            savings: 25_000.0,
            mortgage_balance: 300_000.0,
            mortgage_term_years: 30,
            mortgage_rate: EconomicConditions::default().mortgage_rate,
            adjustable_rate: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactSummary {
    pub inflation_impact: f64,
    pub savings_impact: f64,
    pub mortgage_impact: f64,
    pub total_impact: f64,
    pub current_mortgage_payment: f64,
    pub new_mortgage_payment: f64,
}

pub fn compute_impact(conditions: &EconomicConditions, inputs: &HouseholdInputs) -> ImpactSummary {
    let inflation_cost = inputs.expenses * (conditions.inflation / 100.0);
    let savings_interest = inputs.savings * (conditions.savings_rate() / 100.0);

    let current = monthly_payment(inputs.mortgage_balance, inputs.mortgage_rate, inputs.mortgage_term_years);
    let (new_payment, rate_impact) = if inputs.adjustable_rate {
        let shocked = monthly_payment(
            inputs.mortgage_balance,
            inputs.mortgage_rate + ADJUSTABLE_RATE_SHOCK_PCT,
            inputs.mortgage_term_years,
        );
        (shocked, (shocked - current) * 12.0)
    } else {
        (current, 0.0)
    };

    ImpactSummary {
        inflation_impact: -inflation_cost,
        savings_impact: savings_interest,
        mortgage_impact: -rate_impact,
        total_impact: savings_interest - inflation_cost - rate_impact,
        current_mortgage_payment: current,
        new_mortgage_payment: new_payment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LatestValue;

    fn latest(id: &str, value: f64) -> (String, LatestValue) {
        (
            id.to_string(),
            LatestValue {
                series_id: id.to_string(),
                value: Some(value),
                ..Default::default()
            },
        )
    }

    #[test]
    fn fixed_rate_household_totals() {
        let summary = compute_impact(&EconomicConditions::default(), &HouseholdInputs::default());
        // 48_000 * 3.1% = 1_488; 25_000 * 2.75% = 687.5
        assert!((summary.inflation_impact + 1_488.0).abs() < 1e-9);
        assert!((summary.savings_impact - 687.5).abs() < 1e-9);
        assert_eq!(summary.mortgage_impact, 0.0);
        assert!((summary.total_impact - (687.5 - 1_488.0)).abs() < 1e-9);
        assert_eq!(summary.current_mortgage_payment, summary.new_mortgage_payment);
    }

    #[test]
    fn adjustable_rate_adds_one_point_shock() {
        let inputs = HouseholdInputs {
            adjustable_rate: true,
            ..HouseholdInputs::default()
        };
        let summary = compute_impact(&EconomicConditions::default(), &inputs);
        let expected_new = monthly_payment(300_000.0, 8.1, 30);
        assert!((summary.new_mortgage_payment - expected_new).abs() < 1e-9);
        let annual = (expected_new - summary.current_mortgage_payment) * 12.0;
        assert!((summary.mortgage_impact + annual).abs() < 1e-9);
        assert!(summary.total_impact < -1_488.0 + 687.5);
    }

    #[test]
    fn snapshot_overrides_and_scales_cpi_index() {
        let snapshot: DashboardSnapshot = [
            latest("CPIAUCSL", 310.0),
            latest("FEDFUNDS", 4.33),
            latest("UNRATE", 4.1),
        ]
        .into_iter()
        .collect();
        let c = EconomicConditions::from_snapshot(&snapshot);
        assert!((c.inflation - 3.1).abs() < 1e-9);
        assert!((c.fed_rate - 4.33).abs() < 1e-9);
        assert!((c.unemployment_rate - 4.1).abs() < 1e-9);
        assert_eq!(c.mortgage_rate, 7.1);
    }

    #[test]
    fn empty_snapshot_keeps_defaults() {
        let c = EconomicConditions::from_snapshot(&DashboardSnapshot::new());
        assert_eq!(c, EconomicConditions::default());
    }
}

//! Weight distribution: base shares, regime adjustment, rebalance.
//!
//! Adjusted weights of the available primitives always add up to
//! [`TOTAL_WEIGHT`] after a successful [`WeightDistributor::distribute`].
//! The final rebalance is the only place that restores the total.

use crate::components::Primitive;
use crate::models::MarketRegime;
use crate::signals::categories::RegimeMultiplierTable;

pub const TOTAL_WEIGHT: f64 = 100.0;

/// Sums at or below this are treated as zero
pub const WEIGHT_EPSILON: f64 = 1e-9;

/// Stage at which all weight collapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateStage {
    BaseWeights,
    RegimeAdjustment,
}

/// Scale base weights so they add up to 100. `None` when their sum is ~0.
pub fn distribute_base(base_weights: &[f64]) -> Option<Vec<f64>> {
    let total: f64 = base_weights.iter().sum();
    if !(total > WEIGHT_EPSILON) || !total.is_finite() {
        return None;
    }
    let redistribution_factor = TOTAL_WEIGHT / total;
    Some(
        base_weights
            .iter()
            .map(|w| w * redistribution_factor)
            .collect(),
    )
}

/// Scale weights back to 100 in place. Returns `false` (weights untouched)
/// when the current sum is ~0.
pub fn rebalance(weights: &mut [f64]) -> bool {
    let total: f64 = weights.iter().sum();
    if !(total > WEIGHT_EPSILON) || !total.is_finite() {
        return false;
    }
    let rebalance_factor = TOTAL_WEIGHT / total;
    for weight in weights.iter_mut() {
        *weight *= rebalance_factor;
    }
    true
}

#[derive(Debug, Clone, Default)]
pub struct WeightDistributor {
    multipliers: RegimeMultiplierTable,
}

impl WeightDistributor {
    pub fn new(multipliers: RegimeMultiplierTable) -> Self {
        Self { multipliers }
    }

    pub fn multipliers(&self) -> &RegimeMultiplierTable {
        &self.multipliers
    }

    /// Multiply each weight by its regime multiplier
    pub fn apply_regime(&self, primitives: &[Primitive], weights: &mut [f64], regime: MarketRegime) {
        for (primitive, weight) in primitives.iter().zip(weights.iter_mut()) {
            *weight *= self.multipliers.multiplier(regime, *primitive);
        }
    }

    /// Full pipeline over `(primitive, base weight)` pairs of the available
    /// components, returning adjusted weights in the same order.
    pub fn distribute(
        &self,
        components: &[(Primitive, f64)],
        regime: MarketRegime,
    ) -> Result<Vec<f64>, DegenerateStage> {
        let (primitives, base): (Vec<Primitive>, Vec<f64>) = components.iter().copied().unzip();
        let mut weights = distribute_base(&base).ok_or(DegenerateStage::BaseWeights)?;
        self.apply_regime(&primitives, &mut weights, regime);
        if !rebalance(&mut weights) {
            return Err(DegenerateStage::RegimeAdjustment);
        }
        Ok(weights)
    }
}

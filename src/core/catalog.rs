// src/core/catalog.rs — Tier price/latency table and per-step baselines
//
// These tables and the policy thresholds ship together under POLICY_VERSION.
// Any change to one of them bumps the version.

use std::time::Duration;

use super::budget::Amount;
use super::types::{StepName, Tier};

pub const POLICY_VERSION: &str = "v1.0";

/// Static pricing for a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierSpec {
    pub tier: Tier,
    pub cost: Amount,
    pub latency_ms: u32,
}

pub const TIERS: [TierSpec; 3] = [
    TierSpec {
        tier: Tier::Cheap,
        cost: Amount::from_micros(5_000),
        latency_ms: 80,
    },
    TierSpec {
        tier: Tier::Standard,
        cost: Amount::from_micros(15_000),
        latency_ms: 200,
    },
    TierSpec {
        tier: Tier::Premium,
        cost: Amount::from_micros(30_000),
        latency_ms: 450,
    },
];

/// Baseline tier per step. Only used for downgrade and cost-saved accounting.
pub const BASELINES: [(StepName, Tier); 3] = [
    (StepName::Plan, Tier::Premium),
    (StepName::Execute, Tier::Standard),
    (StepName::Summarize, Tier::Cheap),
];

impl Tier {
    pub fn spec(self) -> &'static TierSpec {
        match self {
            Tier::Cheap => &TIERS[0],
            Tier::Standard => &TIERS[1],
            Tier::Premium => &TIERS[2],
        }
    }

    pub fn cost(self) -> Amount {
        self.spec().cost
    }

    pub fn latency_ms(self) -> u32 {
        self.spec().latency_ms
    }

    pub fn latency(self) -> Duration {
        Duration::from_millis(u64::from(self.latency_ms()))
    }
}

impl StepName {
    pub fn baseline_tier(self) -> Tier {
        BASELINES[self.index()].1
    }
}

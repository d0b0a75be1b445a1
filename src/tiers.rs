use serde::Serialize;

use crate::error::{ AppError, Result };

/// Membership bracket unlocked by an approved deposit.
///
/// Lower level numbers are the premium tiers: level 3 is the entry bracket.
/// Every tier shares the lock period from `SettlementRules`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierDefinition {
    pub level: i32,
    pub name: &'static str,
    pub deposit: i64,
    pub reward_per_task: i64,
    pub max_tasks: i32,
}

impl TierDefinition {
    pub fn daily_income(&self) -> i64 {
        self.reward_per_task * (self.max_tasks as i64)
    }
}

const TIERS: [TierDefinition; 3] = [
    TierDefinition {
        level: 1,
        name: "Platinum",
        deposit: 2_000_000,
        reward_per_task: 5_000,
        max_tasks: 20,
    },
    TierDefinition {
        level: 2,
        name: "Gold",
        deposit: 1_000_000,
        reward_per_task: 2_500,
        max_tasks: 20,
    },
    TierDefinition {
        level: 3,
        name: "Silver",
        deposit: 500_000,
        reward_per_task: 1_250,
        max_tasks: 20,
    },
];

pub fn all() -> &'static [TierDefinition] {
    &TIERS
}

/// Exact-match lookup; there is no tolerance on the deposit amount.
pub fn tier_for_deposit_amount(amount: i64) -> Result<&'static TierDefinition> {
    TIERS.iter()
        .find(|t| t.deposit == amount)
        .ok_or(AppError::InvalidTierAmount(amount))
}

pub fn tier_for_level(level: i32) -> Result<&'static TierDefinition> {
    TIERS.iter()
        .find(|t| t.level == level)
        .ok_or_else(|| AppError::NotFound(format!("Tier {}", level)))
}

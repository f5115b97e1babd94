#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Damage and critical-hit resolution shared by the player and monsters.

use crawl_core::ItemStats;
use rand::Rng;

/// Offensive stats consulted when a character strikes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackProfile {
    /// Lower bound of the damage roll.
    pub min_damage: i32,
    /// Upper bound of the damage roll.
    pub max_damage: i32,
    /// Critical chance in percent.
    pub critical_chance: f64,
}

impl From<ItemStats> for AttackProfile {
    fn from(stats: ItemStats) -> Self {
        Self {
            min_damage: stats.min_damage,
            max_damage: stats.max_damage,
            critical_chance: stats.critical_chance,
        }
    }
}

/// Result of a single resolved attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackOutcome {
    /// Health removed from the defender, never negative.
    pub damage: i32,
    /// Whether the critical roll succeeded.
    pub critical: bool,
}

/// Rolls one attack against a defender wearing `defender_armor`.
///
/// Raw power is drawn uniformly from `[min_damage, max_damage]` and reduced
/// by the armor, flooring at zero. A critical roll only flags the outcome;
/// the doubled power it produces is never applied to the damage.
pub fn resolve_attack<R>(profile: &AttackProfile, defender_armor: i32, rng: &mut R) -> AttackOutcome
where
    R: Rng + ?Sized,
{
    let power = roll_power(profile, rng);
    let damage = (power - defender_armor).max(0);

    let roll: u32 = rng.gen_range(0..100);
    let critical = f64::from(roll) <= profile.critical_chance;

    AttackOutcome { damage, critical }
}

fn roll_power<R>(profile: &AttackProfile, rng: &mut R) -> i32
where
    R: Rng + ?Sized,
{
    if profile.max_damage <= profile.min_damage {
        return profile.min_damage;
    }
    rng.gen_range(profile.min_damage..=profile.max_damage)
}

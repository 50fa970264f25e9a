//! Damage and restoration formulas.

use crate::env::CombatParams;

/// Calculate damage from an attack or damaging skill.
///
/// # Formula
///
/// ```text
/// offense = attack * multiplier / 100
/// reduced = offense - defense / defense_divisor
/// final   = max(reduced, minimum_damage)
/// ```
///
/// The result is monotonic: raising `attack` or `multiplier` never lowers
/// damage, raising `defense` never raises it.
///
/// # Arguments
///
/// * `attack` - Attacker's attack stat
/// * `defense` - Defender's defense stat
/// * `multiplier` - Action multiplier in percent
/// * `params` - Balance parameters
pub fn calculate_damage(attack: u32, defense: u32, multiplier: u32, params: CombatParams) -> u32 {
    let offense = scaled(attack, multiplier);
    let divisor = params.defense_divisor.max(1);
    let reduced = offense.saturating_sub(defense / divisor);
    reduced.max(params.minimum_damage)
}

/// Calculate HP or SP restored by a supportive skill.
///
/// Restoration scales with the caster's attack and always restores at least 1.
pub fn calculate_restoration(attack: u32, multiplier: u32) -> u32 {
    scaled(attack, multiplier).max(1)
}

fn scaled(value: u32, percent: u32) -> u32 {
    let product = u64::from(value) * u64::from(percent) / 100;
    u32::try_from(product).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn defense_reduces_damage() {
        let params = CombatParams::default();
        assert_eq!(calculate_damage(10, 0, 100, params), 10);
        assert_eq!(calculate_damage(10, 4, 100, params), 8);
        assert_eq!(calculate_damage(10, 40, 100, params), params.minimum_damage);
    }

    #[test]
    fn multiplier_scales_offense() {
        let params = CombatParams::default();
        assert_eq!(calculate_damage(10, 0, 150, params), 15);
    }

    #[test]
    fn zero_divisor_is_treated_as_one() {
        let params = CombatParams::new(0, 0, 100);
        assert_eq!(calculate_damage(10, 3, 100, params), 7);
    }

    proptest! {
        #[test]
        fn more_offense_never_less_damage(
            attack in 0u32..10_000,
            extra in 0u32..10_000,
            defense in 0u32..10_000,
            multiplier in 0u32..500,
        ) {
            let params = CombatParams::default();
            let base = calculate_damage(attack, defense, multiplier, params);
            let boosted = calculate_damage(attack + extra, defense, multiplier, params);
            prop_assert!(boosted >= base);
        }

        #[test]
        fn more_defense_never_more_damage(
            attack in 0u32..10_000,
            defense in 0u32..10_000,
            extra in 0u32..10_000,
            multiplier in 0u32..500,
        ) {
            let params = CombatParams::default();
            let base = calculate_damage(attack, defense, multiplier, params);
            let armored = calculate_damage(attack, defense + extra, multiplier, params);
            prop_assert!(armored <= base);
        }
    }
}

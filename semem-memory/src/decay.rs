//! Decay and reinforcement model (`spec.md` §4.F "Decay model").

use chrono::{DateTime, Utc};
use semem_config::DecayConfig;

use crate::types::Interaction;

/// `e^(-λ·Δt)`, `Δt` in seconds between `last_accessed` and `now`.
#[must_use]
pub fn decay_component(last_accessed: DateTime<Utc>, now: DateTime<Utc>, lambda: f64) -> f64 {
    let delta_secs = (now - last_accessed).num_milliseconds().max(0) as f64 / 1000.0;
    (-lambda * delta_secs).exp()
}

/// `log(1 + accessCount)`, the reinforcement boost applied at scoring time.
#[must_use]
pub fn reinforcement_boost(access_count: u32) -> f64 {
    (1.0 + f64::from(access_count)).ln()
}

/// Apply an access to `interaction` at time `now`: bump `access_count`,
/// advance `last_accessed`, and reinforce `decay_factor`, clamped to
/// `[decay_factor_floor, decay_factor_cap]`.
pub fn apply_access(interaction: &mut Interaction, now: DateTime<Utc>, config: &DecayConfig) {
    interaction.access_count += 1;
    interaction.last_accessed = now;
    interaction.decay_factor =
        (interaction.decay_factor * config.reinforcement_multiplier).clamp(config.decay_factor_floor, config.decay_factor_cap);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn decay_component_is_one_at_zero_delta() {
        let now = Utc::now();
        assert!((decay_component(now, now, 1e-4) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn decay_component_shrinks_with_elapsed_time() {
        let now = Utc::now();
        let past = now - Duration::seconds(10_000);
        let decayed = decay_component(past, now, 1e-4);
        assert!(decayed < 1.0);
        assert!(decayed > 0.0);
    }

    #[test]
    fn reinforcement_boost_is_zero_at_zero_accesses() {
        assert!((reinforcement_boost(0)).abs() < 1e-9);
    }

    #[test]
    fn apply_access_increments_and_reinforces() {
        let mut interaction = Interaction::new("p".into(), "r".into(), vec![0.0], vec![], serde_json::Value::Null);
        let config = DecayConfig::default();
        let before = interaction.decay_factor;
        apply_access(&mut interaction, Utc::now(), &config);
        assert_eq!(interaction.access_count, 1);
        assert!(interaction.decay_factor > before);
    }

    #[test]
    fn apply_access_clamps_to_cap() {
        let mut interaction = Interaction::new("p".into(), "r".into(), vec![0.0], vec![], serde_json::Value::Null);
        let config = DecayConfig::default();
        for _ in 0..1000 {
            apply_access(&mut interaction, Utc::now(), &config);
        }
        assert!(interaction.decay_factor <= config.decay_factor_cap);
    }
}

//! Call parameters and retry escalation.
//!
//! [`escalate`] is the only place parameters change between attempts. It is a
//! pure function of the previous parameters, the attempt index and the
//! configured [`ParameterBounds`], so the retry policy can be tested without
//! any backend.

use serde::{Deserialize, Serialize};

/// Sampling parameters for one backend call.
///
/// `None` leaves the knob at the provider's default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl ModelParameters {
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Short human-readable form, e.g. `temperature=0.8 max_tokens=1228`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(t) = self.temperature {
            parts.push(format!("temperature={t:.2}"));
        }
        if let Some(n) = self.max_tokens {
            parts.push(format!("max_tokens={n}"));
        }
        if let Some(p) = self.top_p {
            parts.push(format!("top_p={p:.2}"));
        }
        if let Some(s) = self.seed {
            parts.push(format!("seed={s}"));
        }
        if parts.is_empty() {
            "defaults".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Limits applied by [`escalate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterBounds {
    /// Added to the temperature on each retry
    pub temperature_step: f64,
    /// Temperature never escalates past this value
    pub max_temperature: f64,
    /// Temperature assumed when the prior attempt left it unset
    pub base_temperature: f64,
    /// Multiplier applied to `max_tokens` on each retry
    pub max_tokens_factor: f64,
    /// `max_tokens` never escalates past this value
    pub max_tokens_ceiling: u32,
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self {
            temperature_step: 0.1,
            max_temperature: 1.0,
            base_temperature: 0.7,
            max_tokens_factor: 1.2,
            max_tokens_ceiling: 8192,
        }
    }
}

/// Derive the parameters for a retry.
///
/// Temperature rises by `temperature_step` (capped at `max_temperature`),
/// `max_tokens` grows by `max_tokens_factor` (capped at
/// `max_tokens_ceiling`), `top_p` is kept. When both knobs are saturated the
/// sampling seed is changed instead, so the result never equals `prior`.
pub fn escalate(
    prior: &ModelParameters,
    attempt_index: usize,
    bounds: &ParameterBounds,
) -> ModelParameters {
    let mut next = prior.clone();

    let current = prior.temperature.unwrap_or(bounds.base_temperature);
    next.temperature = Some(round_hundredths(
        (current + bounds.temperature_step).min(bounds.max_temperature),
    ));

    if let Some(tokens) = prior.max_tokens {
        let grown = (f64::from(tokens) * bounds.max_tokens_factor).round();
        let grown = if grown >= f64::from(bounds.max_tokens_ceiling) {
            bounds.max_tokens_ceiling
        } else {
            grown as u32
        };
        next.max_tokens = Some(grown.max(tokens.min(bounds.max_tokens_ceiling)));
    }

    if next == *prior {
        next.seed = Some(match prior.seed {
            Some(seed) => seed.wrapping_add(1),
            None => attempt_index as u64,
        });
    }

    next
}

/// Avoid 0.7999999 style drift from repeated float addition.
fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalate_raises_temperature_and_tokens() {
        let prior = ModelParameters::default()
            .with_temperature(0.7)
            .with_max_tokens(1000);
        let next = escalate(&prior, 1, &ParameterBounds::default());
        assert_eq!(next.temperature, Some(0.8));
        assert_eq!(next.max_tokens, Some(1200));
        assert_eq!(next.seed, None);
        assert_ne!(next, prior);
    }

    #[test]
    fn test_escalate_caps_temperature() {
        let prior = ModelParameters::default().with_temperature(0.95);
        let next = escalate(&prior, 1, &ParameterBounds::default());
        assert_eq!(next.temperature, Some(1.0));
    }

    #[test]
    fn test_escalate_unset_temperature_starts_from_base() {
        let next = escalate(&ModelParameters::default(), 1, &ParameterBounds::default());
        assert_eq!(next.temperature, Some(0.8));
        assert_eq!(next.max_tokens, None);
    }

    #[test]
    fn test_escalate_caps_tokens() {
        let bounds = ParameterBounds {
            max_tokens_ceiling: 1100,
            ..Default::default()
        };
        let prior = ModelParameters::default().with_max_tokens(1000);
        assert_eq!(escalate(&prior, 1, &bounds).max_tokens, Some(1100));
    }

    #[test]
    fn test_escalate_saturated_changes_seed() {
        let prior = ModelParameters::default()
            .with_temperature(1.0)
            .with_max_tokens(8192);
        let next = escalate(&prior, 2, &ParameterBounds::default());
        assert_eq!(next.temperature, Some(1.0));
        assert_eq!(next.max_tokens, Some(8192));
        assert_eq!(next.seed, Some(2));
        assert_ne!(next, prior);

        let again = escalate(&next, 3, &ParameterBounds::default());
        assert_eq!(again.seed, Some(3));
        assert_ne!(again, next);
    }

    #[test]
    fn test_escalate_never_repeats_over_many_attempts() {
        let bounds = ParameterBounds::default();
        let mut params = ModelParameters::default().with_temperature(0.5).with_max_tokens(512);
        for attempt in 1..20 {
            let next = escalate(&params, attempt, &bounds);
            assert_ne!(next, params, "attempt {attempt} repeated parameters");
            params = next;
        }
    }

    #[test]
    fn test_summary() {
        assert_eq!(ModelParameters::default().summary(), "defaults");
        let p = ModelParameters::default().with_temperature(0.8).with_max_tokens(1200);
        assert_eq!(p.summary(), "temperature=0.80 max_tokens=1200");
    }
}

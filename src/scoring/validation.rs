use super::config::ScoringConfig;

/// Validate scoring configuration before any stage runs.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if !config.lambda.is_finite() || !(0.0..=1.0).contains(&config.lambda) {
        errors.push(format!(
            "scoring.lambda: must be between 0 and 1, got {}",
            config.lambda
        ));
    }

    if !config.shrinkage_k.is_finite() || config.shrinkage_k < 0.0 {
        errors.push(format!(
            "scoring.shrinkage_k: must be non-negative, got {}",
            config.shrinkage_k
        ));
    }

    if !config.minutes_ref.is_finite() || config.minutes_ref <= 0.0 {
        errors.push(format!(
            "scoring.minutes_ref: must be positive, got {}",
            config.minutes_ref
        ));
    }

    if !config.min_nineties.is_finite() || config.min_nineties < 0.0 {
        errors.push(format!(
            "scoring.min_nineties: must be non-negative, got {}",
            config.min_nineties
        ));
    }

    if !is_valid_weight(config.default_comp_weight) {
        errors.push(format!(
            "scoring.default_comp_weight: must be non-negative, got {}",
            config.default_comp_weight
        ));
    }

    for (competition, weight) in &config.comp_weights {
        if !is_valid_weight(*weight) {
            errors.push(format!(
                "scoring.comp_weights[{}]: must be non-negative, got {}",
                competition, weight
            ));
        }
    }

    // Only selected positions need a profile; the rest can never reach scoring
    for position in &config.positions {
        if !config.metric_weights.contains_key(position) {
            errors.push(format!(
                "scoring.metric_weights: no weights for position {}",
                position
            ));
        }
    }

    for (position, weights) in &config.metric_weights {
        for (metric, weight) in weights {
            if !is_valid_weight(*weight) {
                errors.push(format!(
                    "scoring.metric_weights[{}].{}: must be non-negative, got {}",
                    position, metric, weight
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_valid_weight(w: f64) -> bool {
    w.is_finite() && w >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Metric, PositionCategory};

    #[test]
    fn test_valid_config() {
        assert!(validate_scoring(&ScoringConfig::default()).is_ok());
    }

    #[test]
    fn test_lambda_bounds_inclusive() {
        let mut config = ScoringConfig::default();
        config.lambda = 0.0;
        assert!(validate_scoring(&config).is_ok());
        config.lambda = 1.0;
        assert!(validate_scoring(&config).is_ok());
    }

    #[test]
    fn test_lambda_out_of_range() {
        let mut config = ScoringConfig::default();
        config.lambda = 1.2;
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("scoring.lambda"));
    }

    #[test]
    fn test_lambda_nan_rejected() {
        let mut config = ScoringConfig::default();
        config.lambda = f64::NAN;
        assert!(validate_scoring(&config).is_err());
    }

    #[test]
    fn test_negative_k() {
        let mut config = ScoringConfig::default();
        config.shrinkage_k = -1.0;
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("shrinkage_k"));
    }

    #[test]
    fn test_zero_k_allowed() {
        let mut config = ScoringConfig::default();
        config.shrinkage_k = 0.0;
        assert!(validate_scoring(&config).is_ok());
    }

    #[test]
    fn test_zero_minutes_ref() {
        let mut config = ScoringConfig::default();
        config.minutes_ref = 0.0;
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("minutes_ref"));
    }

    #[test]
    fn test_missing_position_profile_named() {
        let mut config = ScoringConfig::default();
        config.positions.insert(PositionCategory::Goalkeeper);
        config.metric_weights.remove(&PositionCategory::Goalkeeper);
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("GK"));
    }

    #[test]
    fn test_unselected_position_may_lack_profile() {
        let mut config = ScoringConfig::default();
        config.metric_weights.remove(&PositionCategory::Goalkeeper);
        assert!(validate_scoring(&config).is_ok());
    }

    #[test]
    fn test_negative_metric_weight() {
        let mut config = ScoringConfig::default();
        config
            .metric_weights
            .get_mut(&PositionCategory::Forward)
            .unwrap()
            .insert(Metric::Xg, -0.5);
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.metric_weights[FWD].xg"));
    }

    #[test]
    fn test_negative_comp_weight() {
        let mut config = ScoringConfig::default();
        config.comp_weights.insert("Bundesliga".to_string(), -2.0);
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.comp_weights[Bundesliga]"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ScoringConfig::default();
        config.lambda = -0.1; // Error 1
        config.shrinkage_k = -5.0; // Error 2
        config.min_nineties = f64::INFINITY; // Error 3
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}

//! Builder API and settings for checkout rules.

use crate::enforcement::context::RequestContext;
use crate::enforcement::rules::{CheckoutRules, RequestCheck};
use crate::enforcement::violations::Violation;
use chrono::Duration;
use serde::Deserialize;
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Builder for creating checkout rules
pub struct RulesBuilder {
    max_loan_duration: Option<Duration>,
    require_collection_return_date: bool,
    custom_checks: Vec<RequestCheck>,
}

impl RulesBuilder {
    pub fn new() -> Self {
        Self {
            max_loan_duration: None,
            require_collection_return_date: false,
            custom_checks: Vec::new(),
        }
    }

    /// Cap the time between loan start and the requested return date
    pub fn max_loan_duration(mut self, duration: Duration) -> Self {
        self.max_loan_duration = Some(duration);
        self
    }

    /// Make the return date mandatory for collection equipment too
    pub fn require_collection_return_date(mut self) -> Self {
        self.require_collection_return_date = true;
        self
    }

    /// Add a custom validation check
    pub fn require<F>(mut self, check: F) -> Self
    where
        F: Fn(&RequestContext) -> Validation<(), NonEmptyVec<Violation>> + Send + Sync + 'static,
    {
        self.custom_checks.push(Arc::new(check));
        self
    }

    /// Add a simple predicate check with error message
    pub fn require_pred<F>(mut self, predicate: F, error_msg: String) -> Self
    where
        F: Fn(&RequestContext) -> bool + Send + Sync + 'static,
    {
        let check = move |ctx: &RequestContext| {
            if predicate(ctx) {
                Validation::success(())
            } else {
                Validation::fail(Violation::CustomCheckFailed {
                    message: error_msg.clone(),
                })
            }
        };
        self.custom_checks.push(Arc::new(check));
        self
    }

    /// Build the checkout rules
    pub fn build(self) -> CheckoutRules {
        CheckoutRules {
            max_loan_duration: self.max_loan_duration,
            require_collection_return_date: self.require_collection_return_date,
            custom_checks: self.custom_checks,
        }
    }
}

impl Default for RulesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors raised while loading rule settings.
#[derive(Debug, Error)]
pub enum RulesConfigError {
    #[error("Invalid rules configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Maximum loan length must be at least one day")]
    ZeroLoanDays,
}

/// Serializable rule settings, typically shipped alongside the client.
///
/// Missing fields fall back to the defaults: no loan limit and no return
/// date required for collections.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub max_loan_days: Option<u32>,
    pub require_collection_return_date: bool,
}

impl RulesConfig {
    pub fn from_json(json: &str) -> Result<Self, RulesConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.max_loan_days == Some(0) {
            return Err(RulesConfigError::ZeroLoanDays);
        }
        Ok(config)
    }

    /// Start a builder seeded with these settings; custom checks can be
    /// added before building.
    pub fn into_builder(self) -> RulesBuilder {
        let mut builder = RulesBuilder::new();
        if let Some(days) = self.max_loan_days {
            builder = builder.max_loan_duration(Duration::days(i64::from(days)));
        }
        if self.require_collection_return_date {
            builder = builder.require_collection_return_date();
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EquipmentKind;
    use crate::enforcement::rules::collect_failures;
    use chrono::{Datelike, TimeZone, Utc, Weekday};

    #[test]
    fn require_adds_custom_validation() {
        let rules = RulesBuilder::new()
            .require(|ctx: &RequestContext| match ctx.return_date {
                Some(date) if date.weekday() == Weekday::Sun => {
                    Validation::fail(Violation::CustomCheckFailed {
                        message: "Lab is closed on Sundays".to_string(),
                    })
                }
                _ => Validation::success(()),
            })
            .build();

        // 2024-06-01 is a Saturday.
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let sunday = RequestContext::checkout(
            EquipmentKind::Singleton,
            Some(now + Duration::days(1)),
            now,
        );
        let monday = RequestContext::checkout(
            EquipmentKind::Singleton,
            Some(now + Duration::days(2)),
            now,
        );

        assert_eq!(
            collect_failures(rules.enforce(&sunday)),
            vec![Violation::CustomCheckFailed {
                message: "Lab is closed on Sundays".to_string(),
            }]
        );
        assert!(rules.enforce(&monday).is_success());
    }

    #[test]
    fn config_defaults_when_fields_missing() {
        let config = RulesConfig::from_json("{}").unwrap();
        assert_eq!(config, RulesConfig::default());

        let rules = config.into_builder().build();
        assert!(rules.max_loan_duration().is_none());
        assert!(!rules.requires_collection_return_date());
    }

    #[test]
    fn config_seeds_builder() {
        let config = RulesConfig::from_json(
            r#"{ "max_loan_days": 30, "require_collection_return_date": true }"#,
        )
        .unwrap();

        let rules = config.into_builder().build();
        assert_eq!(rules.max_loan_duration(), Some(Duration::days(30)));
        assert!(rules.requires_collection_return_date());
    }

    #[test]
    fn config_rejects_malformed_json() {
        let result = RulesConfig::from_json(r#"{ "max_loan_days": "soon" }"#);
        assert!(matches!(result, Err(RulesConfigError::Parse(_))));
    }

    #[test]
    fn config_rejects_zero_day_loans() {
        let result = RulesConfig::from_json(r#"{ "max_loan_days": 0 }"#);
        assert!(matches!(result, Err(RulesConfigError::ZeroLoanDays)));
    }
}

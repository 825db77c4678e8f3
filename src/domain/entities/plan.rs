use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Billing interval of a plan, as reported by the provider.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PlanInterval {
    Day,
    Week,
    Month,
    Year,
}

/// A plan from the provider's catalog. `name` is the identifier a subscription
/// refers to and the value accepted when swapping plans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub name: String,
    pub nickname: Option<String>,
    /// Price in the currency's minor unit.
    pub amount: i64,
    pub interval: PlanInterval,
    pub interval_count: i32,
    pub currency: String,
}

impl Plan {
    pub fn new(name: impl Into<String>, amount: i64, interval: PlanInterval) -> Self {
        Self {
            name: name.into(),
            nickname: None,
            amount,
            interval,
            interval_count: 1,
            currency: "eur".to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn interval(&self) -> PlanInterval {
        self.interval
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_parses_case_insensitively() {
        assert_eq!("Month".parse::<PlanInterval>(), Ok(PlanInterval::Month));
        assert_eq!("year".parse::<PlanInterval>(), Ok(PlanInterval::Year));
        assert!("fortnight".parse::<PlanInterval>().is_err());
    }

    #[test]
    fn interval_displays_lowercase() {
        assert_eq!(PlanInterval::Week.to_string(), "week");
        assert_eq!(PlanInterval::Day.as_ref(), "day");
    }

    #[test]
    fn interval_serializes_lowercase() {
        let json = serde_json::to_value(PlanInterval::Month).unwrap();
        assert_eq!(json, serde_json::json!("month"));
    }
}

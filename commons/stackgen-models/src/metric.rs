use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ValidationError;
use crate::validation::invalid;

/// Aggregation applied to a metric over its period.
///
/// Parses the short forms used in dashboards (`avg`, `n`, `p95`) as well as
/// the provider's canonical names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Statistic {
    SampleCount,
    Average,
    Sum,
    Minimum,
    Maximum,
    Percentile(f64),
}

impl Statistic {
    pub fn is_percentile(&self) -> bool {
        matches!(self, Statistic::Percentile(_))
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statistic::SampleCount => f.write_str("SampleCount"),
            Statistic::Average => f.write_str("Average"),
            Statistic::Sum => f.write_str("Sum"),
            Statistic::Minimum => f.write_str("Minimum"),
            Statistic::Maximum => f.write_str("Maximum"),
            Statistic::Percentile(p) => write!(f, "p{}", p),
        }
    }
}

impl FromStr for Statistic {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let stat = match lower.as_str() {
            "n" | "samplecount" | "sample_count" => Statistic::SampleCount,
            "avg" | "average" => Statistic::Average,
            "sum" => Statistic::Sum,
            "min" | "minimum" => Statistic::Minimum,
            "max" | "maximum" => Statistic::Maximum,
            other => {
                let p = other
                    .strip_prefix('p')
                    .and_then(|v| v.parse::<f64>().ok())
                    .filter(|p| *p > 0.0 && *p <= 100.0)
                    .ok_or_else(|| ValidationError::InvalidStatistic(s.to_string()))?;
                Statistic::Percentile(p)
            }
        };
        Ok(stat)
    }
}

impl TryFrom<String> for Statistic {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Statistic> for String {
    fn from(value: Statistic) -> Self {
        value.to_string()
    }
}

/// A metric addressed by namespace, name and dimensions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct MetricSpec {
    #[validate(length(min = 1, message = "Metric namespace cannot be empty"))]
    pub namespace: String,
    #[validate(length(min = 1, message = "Metric name cannot be empty"))]
    pub metric_name: String,
    pub statistic: Statistic,
    #[validate(custom(function = "validate_period"))]
    pub period_secs: u32,
    #[serde(
        default,
        with = "crate::entries",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub dimensions: BTreeMap<String, String>,
}

impl MetricSpec {
    pub fn new(
        namespace: impl Into<String>,
        metric_name: impl Into<String>,
        statistic: Statistic,
        period_secs: u32,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            metric_name: metric_name.into(),
            statistic,
            period_secs,
            dimensions: BTreeMap::new(),
        }
    }
}

/// High-resolution periods (1, 5, 10, 30) or any multiple of a minute.
pub fn validate_period(period: u32) -> Result<(), validator::ValidationError> {
    if matches!(period, 1 | 5 | 10 | 30) || (period > 0 && period % 60 == 0) {
        Ok(())
    } else {
        Err(invalid(
            "period",
            format!(
                "Metric period {}s must be 1, 5, 10, 30 or a multiple of 60",
                period
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dashboard_shorthands() {
        assert_eq!("avg".parse::<Statistic>().unwrap(), Statistic::Average);
        assert_eq!("n".parse::<Statistic>().unwrap(), Statistic::SampleCount);
        assert_eq!("Sum".parse::<Statistic>().unwrap(), Statistic::Sum);
        assert_eq!(
            "p95".parse::<Statistic>().unwrap(),
            Statistic::Percentile(95.0)
        );
        assert!("p0".parse::<Statistic>().is_err());
        assert!("median".parse::<Statistic>().is_err());
    }

    #[test]
    fn displays_canonical_names() {
        assert_eq!(Statistic::Average.to_string(), "Average");
        assert_eq!(Statistic::Percentile(95.0).to_string(), "p95");
        assert_eq!(Statistic::Percentile(99.9).to_string(), "p99.9");
    }

    #[test]
    fn serde_goes_through_strings() {
        let stat: Statistic = serde_json::from_str("\"p99\"").unwrap();
        assert_eq!(stat, Statistic::Percentile(99.0));
        assert_eq!(
            serde_json::to_string(&Statistic::SampleCount).unwrap(),
            "\"SampleCount\""
        );
    }

    #[test]
    fn period_rules() {
        assert!(validate_period(60).is_ok());
        assert!(validate_period(300).is_ok());
        assert!(validate_period(10).is_ok());
        assert!(validate_period(0).is_err());
        assert!(validate_period(45).is_err());
    }
}

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_max_iterations() -> usize {
    25
}

fn default_check_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Configuration for one Ralph Loop run (§4.12). Limits apply globally
/// across all iterations, not per iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RalphConfig {
    /// Shell commands run after each iteration; all must succeed to stop.
    pub checks: Vec<String>,
    /// Optional file whose content is folded into every iteration's prompt.
    #[serde(default)]
    pub spec_file: Option<PathBuf>,
    /// Hard cap on iterations.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Hard cap on accumulated cost across all iterations.
    #[serde(default)]
    pub max_cost_usd: Option<f64>,
    /// Hard cap on wall-clock time across all iterations.
    #[serde(default, with = "duration_secs_opt")]
    pub max_time: Option<Duration>,
    /// If the agent's final output matches this regex, accept early even
    /// if checks have not been run yet this iteration.
    #[serde(default)]
    pub completion_tag: Option<String>,
    /// Per-check subprocess timeout.
    #[serde(default = "default_check_timeout", with = "duration_secs")]
    pub check_timeout: Duration,
}

impl Default for RalphConfig {
    fn default() -> Self {
        Self {
            checks: Vec::new(),
            spec_file: None,
            max_iterations: default_max_iterations(),
            max_cost_usd: None,
            max_time: None,
            completion_tag: None,
            check_timeout: default_check_timeout(),
        }
    }
}

mod duration_secs {
    use super::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

mod duration_secs_opt {
    use super::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&d.as_secs()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_secs))
    }
}

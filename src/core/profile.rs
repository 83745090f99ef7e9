use crate::error::Error;
use crate::error::LastError;
use colored::Colorize;
use serde_derive::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable consulted for a job-submission wrapper when the
/// profile does not set one (cluster installs export this globally).
pub const SUBMISSION_ENV_VAR: &str = "SIMBRIDGE_SUBMISSION";

const DEF_LIBRARY_TOOL: &str = "vlib";
const DEF_MAPPING_TOOL: &str = "vmap";
const DEF_COMPILE_TOOL: &str = "vcom";
const DEF_SIMULATE_TOOL: &str = "vsim";
const DEF_RESOLUTION: &str = "1ps";

/// A user-defined configuration for the external simulator toolchain.
///
/// Every field is optional in the TOML source; getters fall back to the
/// stock Questa/ModelSim tool names and settings.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    library_tool: Option<String>,
    mapping_tool: Option<String>,
    compile_tool: Option<String>,
    simulate_tool: Option<String>,
    resolution: Option<String>,
    submission: Option<String>,
    poll: Option<PollPolicy>,
}

impl Profile {
    pub fn new() -> Self {
        Self {
            library_tool: None,
            mapping_tool: None,
            compile_tool: None,
            simulate_tool: None,
            resolution: None,
            submission: None,
            poll: None,
        }
    }

    pub fn get_library_tool(&self) -> &str {
        self.library_tool.as_deref().unwrap_or(DEF_LIBRARY_TOOL)
    }

    pub fn get_mapping_tool(&self) -> &str {
        self.mapping_tool.as_deref().unwrap_or(DEF_MAPPING_TOOL)
    }

    pub fn get_compile_tool(&self) -> &str {
        self.compile_tool.as_deref().unwrap_or(DEF_COMPILE_TOOL)
    }

    pub fn get_simulate_tool(&self) -> &str {
        self.simulate_tool.as_deref().unwrap_or(DEF_SIMULATE_TOOL)
    }

    pub fn get_resolution(&self) -> &str {
        self.resolution.as_deref().unwrap_or(DEF_RESOLUTION)
    }

    pub fn get_poll_policy(&self) -> PollPolicy {
        self.poll.clone().unwrap_or_default()
    }

    /// Determines the job-submission prefix for batch runs.
    ///
    /// Prefers the profile's own `submission` entry, then the
    /// `SIMBRIDGE_SUBMISSION` environment variable. Returns `None` when
    /// neither is set, which means the simulator runs on the local host.
    pub fn resolve_submission(&self) -> Option<String> {
        match &self.submission {
            Some(s) => Some(s.clone()),
            None => match std::env::var(SUBMISSION_ENV_VAR) {
                Ok(s) => Some(s),
                Err(_) => {
                    println!(
                        "{}: {} is not set; simulation runs on the local host",
                        "warning".yellow(),
                        SUBMISSION_ENV_VAR
                    );
                    None
                }
            },
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Profile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s).map_err(|e| Error::ProfileNotParsed(LastError(e.to_string())))
    }
}

/// Retry policy for waiting on exchange files to appear.
///
/// Checks are spaced by `interval_ms` growing geometrically by `backoff`
/// until `timeout_sec` has elapsed in total.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct PollPolicy {
    timeout_sec: Option<f32>,
    interval_ms: Option<u64>,
    backoff: Option<f32>,
}

impl PollPolicy {
    pub fn new() -> Self {
        Self {
            timeout_sec: None,
            interval_ms: None,
            backoff: None,
        }
    }

    pub fn timeout(mut self, sec: f32) -> Self {
        self.timeout_sec = Some(sec);
        self
    }

    pub fn interval(mut self, ms: u64) -> Self {
        self.interval_ms = Some(ms);
        self
    }

    pub fn get_timeout(&self) -> Duration {
        Duration::from_secs_f32(self.timeout_sec.unwrap_or(60.0))
    }

    pub fn get_timeout_sec(&self) -> f32 {
        self.timeout_sec.unwrap_or(60.0)
    }

    pub fn get_interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.unwrap_or(250))
    }

    pub fn get_backoff(&self) -> f32 {
        // never allow the interval to shrink between checks
        let b = self.backoff.unwrap_or(2.0);
        if b < 1.0 {
            1.0
        } else {
            b
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const P_1: &str = r#"
compile_tool = "ghdl"
simulate_tool = "ghdl"
resolution = "1ns"
submission = "bsub -q normal"

poll.timeout_sec = 10.0
poll.interval_ms = 100
"#;

    const P_2: &str = r#"
library_tool = "vlib"
"#;

    #[test]
    fn ut_from_toml_string() {
        let prof = Profile::from_str(P_1).unwrap();
        assert_eq!(prof.get_compile_tool(), "ghdl");
        assert_eq!(prof.get_simulate_tool(), "ghdl");
        assert_eq!(prof.get_resolution(), "1ns");
        assert_eq!(prof.resolve_submission(), Some(String::from("bsub -q normal")));
        assert_eq!(prof.get_poll_policy().get_timeout(), Duration::from_secs(10));
        assert_eq!(prof.get_poll_policy().get_interval(), Duration::from_millis(100));
    }

    #[test]
    fn ut_defaults() {
        let prof = Profile::from_str(P_2).unwrap();
        assert_eq!(prof.get_library_tool(), "vlib");
        assert_eq!(prof.get_mapping_tool(), "vmap");
        assert_eq!(prof.get_compile_tool(), "vcom");
        assert_eq!(prof.get_simulate_tool(), "vsim");
        assert_eq!(prof.get_resolution(), "1ps");
        assert_eq!(prof.get_poll_policy(), PollPolicy::default());
    }

    #[test]
    fn ut_reject_unknown_field() {
        let result = Profile::from_str("simulator = \"vsim\"");
        assert_eq!(result.is_err(), true);
    }

    #[test]
    fn ut_submission_env_fallback() {
        let prof = Profile::from_str(P_2).unwrap();
        std::env::set_var(SUBMISSION_ENV_VAR, "sbatch --wait");
        assert_eq!(
            prof.resolve_submission(),
            Some(String::from("sbatch --wait"))
        );
        std::env::remove_var(SUBMISSION_ENV_VAR);
        // neither the profile nor the environment names a wrapper: run locally
        assert_eq!(prof.resolve_submission(), None);
        // a profile entry always wins over the environment
        let prof = Profile::from_str(P_1).unwrap();
        std::env::set_var(SUBMISSION_ENV_VAR, "sbatch --wait");
        assert_eq!(
            prof.resolve_submission(),
            Some(String::from("bsub -q normal"))
        );
        std::env::remove_var(SUBMISSION_ENV_VAR);
    }

    #[test]
    fn ut_backoff_floor() {
        let policy = PollPolicy {
            timeout_sec: None,
            interval_ms: None,
            backoff: Some(0.25),
        };
        assert_eq!(policy.get_backoff(), 1.0);
    }
}

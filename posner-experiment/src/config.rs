use crate::error::{ConfigError, ConfigViolation, ViolationKind};
use crate::sequence::{DEFAULT_MAX_ATTEMPTS, SequenceSpec};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Validated experiment parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    /// Existing directory; results go to `root/data`.
    pub root: PathBuf,
    pub fix_dur: Duration,
    pub cue_dur: Duration,
    pub n_blocks: usize,
    pub sequence: SequenceSpec,
    /// `None` waits for a response indefinitely.
    pub response_timeout: Option<Duration>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            fix_dur: Duration::from_millis(500),
            cue_dur: Duration::from_millis(200),
            n_blocks: 1,
            sequence: SequenceSpec::new(20, 0.8),
            response_timeout: None,
        }
    }
}

impl ExperimentConfig {
    /// Reads a JSON config file. A relative `root` is resolved against the
    /// directory containing the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&text)?;
        Self::from_value(&value, path.parent())
    }

    /// Validates a parsed document, reporting every violation at once.
    pub fn from_value(value: &Value, base_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(doc) = value.as_object() else {
            return Err(ConfigError::Invalid(vec![ConfigViolation::new(
                "config",
                ViolationKind::WrongType {
                    expected: "a JSON object",
                },
            )]));
        };

        let mut fields = Fields {
            doc,
            violations: Vec::new(),
        };

        let root = fields.root("root", base_dir);
        let fix_dur = fields.seconds("fix_dur", true);
        let cue_dur = fields.seconds("cue_dur", true);
        let n_blocks = fields.integer("n_blocks", true, 1);
        let n_trials = fields.integer("n_trials", true, 0);
        let p_valid = fields.probability("p_valid");
        let min_gap = fields.integer("min_gap", false, 0).or(Some(0));
        let max_attempts = fields
            .integer("max_attempts", false, 1)
            .or(Some(DEFAULT_MAX_ATTEMPTS));
        let response_timeout = fields.seconds("response_timeout", false);

        let sequence = match (n_trials, p_valid, min_gap, max_attempts) {
            (Some(n), Some(p), Some(gap), Some(attempts)) => {
                let spec = SequenceSpec::new(n, p)
                    .with_min_gap(gap)
                    .with_max_attempts(attempts);
                match spec.validate() {
                    Ok(()) => Some(spec),
                    Err(e) => {
                        fields.push("n_trials/p_valid", ViolationKind::Sequence(e));
                        None
                    }
                }
            }
            _ => None,
        };

        match (root, fix_dur, cue_dur, n_blocks, sequence) {
            (Some(root), Some(fix_dur), Some(cue_dur), Some(n_blocks), Some(sequence))
                if fields.violations.is_empty() =>
            {
                Ok(Self {
                    root,
                    fix_dur,
                    cue_dur,
                    n_blocks,
                    sequence,
                    response_timeout,
                })
            }
            _ => Err(ConfigError::Invalid(fields.violations)),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }
}

/// Field extraction that records problems instead of stopping at the first one.
struct Fields<'a> {
    doc: &'a Map<String, Value>,
    violations: Vec<ConfigViolation>,
}

impl<'a> Fields<'a> {
    fn push(&mut self, key: &str, kind: ViolationKind) {
        self.violations.push(ConfigViolation::new(key, kind));
    }

    fn get(&mut self, key: &str, required: bool) -> Option<&'a Value> {
        let doc = self.doc;
        match doc.get(key) {
            Some(Value::Null) | None => {
                if required {
                    self.push(key, ViolationKind::Missing);
                }
                None
            }
            Some(v) => Some(v),
        }
    }

    fn wrong_type(&mut self, key: &str, expected: &'static str) {
        self.push(key, ViolationKind::WrongType { expected });
    }

    fn out_of_range(&mut self, key: &str, reason: impl Into<String>) {
        self.push(
            key,
            ViolationKind::OutOfRange {
                reason: reason.into(),
            },
        );
    }

    fn root(&mut self, key: &str, base_dir: Option<&Path>) -> Option<PathBuf> {
        let raw = match self.get(key, true)? {
            Value::String(s) => PathBuf::from(s),
            _ => {
                self.wrong_type(key, "a path string");
                return None;
            }
        };
        let root = match base_dir {
            Some(base) if raw.is_relative() => base.join(raw),
            _ => raw,
        };
        if !root.is_dir() {
            self.out_of_range(
                key,
                format!("{} does not exist; create it or edit the configuration", root.display()),
            );
            return None;
        }
        Some(root)
    }

    fn seconds(&mut self, key: &str, required: bool) -> Option<Duration> {
        let Some(secs) = self.get(key, required)?.as_f64() else {
            self.wrong_type(key, "a positive number of seconds");
            return None;
        };
        if !(secs > 0.0 && secs.is_finite()) {
            self.out_of_range(key, "must be positive");
            return None;
        }
        match Duration::try_from_secs_f64(secs) {
            Ok(d) => Some(d),
            Err(_) => {
                self.out_of_range(key, "is too large");
                None
            }
        }
    }

    fn integer(&mut self, key: &str, required: bool, min: usize) -> Option<usize> {
        let value = self.get(key, required)?;
        if let Some(n) = value.as_u64() {
            let n = n as usize;
            if n < min {
                self.out_of_range(key, format!("must be at least {min}"));
                return None;
            }
            return Some(n);
        }
        if value.is_i64() {
            self.out_of_range(key, "must not be negative");
        } else {
            self.wrong_type(key, "an integer");
        }
        None
    }

    fn probability(&mut self, key: &str) -> Option<f64> {
        let Some(p) = self.get(key, true)?.as_f64() else {
            self.wrong_type(key, "a number");
            return None;
        };
        if !(p > 0.0 && p <= 1.0) {
            self.out_of_range(key, "must be a value in (0, 1]");
            return None;
        }
        Some(p)
    }
}

use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SKILLGATE_SKILL_PATHS") {
            self.skills.paths = v
                .split(',')
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = std::env::var("SKILLGATE_INCLUDE_PROJECT") {
            if let Ok(enabled) = v.parse::<bool>() {
                self.skills.include_project = enabled;
            } else {
                tracing::warn!("ignoring invalid SKILLGATE_INCLUDE_PROJECT value: {v}");
            }
        }
        if let Ok(v) = std::env::var("SKILLGATE_SIMILARITY_THRESHOLD") {
            if let Ok(threshold) = v.parse::<f64>() {
                self.similarity.threshold = threshold;
            } else {
                tracing::warn!("ignoring invalid SKILLGATE_SIMILARITY_THRESHOLD value: {v}");
            }
        }
        if let Ok(v) = std::env::var("SKILLGATE_STRICT") {
            if let Ok(strict) = v.parse::<bool>() {
                self.validation.strict = strict;
            } else {
                tracing::warn!("ignoring invalid SKILLGATE_STRICT value: {v}");
            }
        }
        if let Ok(v) = std::env::var("SKILLGATE_VERBOSE") {
            if let Ok(verbose) = v.parse::<bool>() {
                self.validation.verbose = verbose;
            } else {
                tracing::warn!("ignoring invalid SKILLGATE_VERBOSE value: {v}");
            }
        }
        if let Ok(v) = std::env::var("SKILLGATE_ASSUME_YES") {
            if let Ok(yes) = v.parse::<bool>() {
                self.gate.assume_yes = yes;
            } else {
                tracing::warn!("ignoring invalid SKILLGATE_ASSUME_YES value: {v}");
            }
        }
    }
}

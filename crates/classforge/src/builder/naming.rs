use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::description::TypeDescription;

const RENAMED_PACKAGE: &str = "classforge.renamed";
const SUFFIX_LENGTH: usize = 8;

/// Names generated types that were not given a name explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingStrategy {
    /// `<super type>$<suffix>$<random>`. Subclasses of `java.*` types are
    /// moved to a package of their own, since those packages are sealed.
    SuffixingRandom { suffix: String },
    Fixed(String),
}

impl Default for NamingStrategy {
    fn default() -> Self {
        Self::SuffixingRandom {
            suffix: "ClassForge".to_string(),
        }
    }
}

impl NamingStrategy {
    pub fn suffixing_random(suffix: impl Into<String>) -> Self {
        Self::SuffixingRandom {
            suffix: suffix.into(),
        }
    }

    pub fn name(&self, super_type: &TypeDescription) -> String {
        match self {
            Self::Fixed(name) => name.clone(),
            Self::SuffixingRandom { suffix } => {
                let base = super_type.name();
                let random = random_suffix();
                if base.starts_with("java.") {
                    format!("{RENAMED_PACKAGE}.{base}${suffix}${random}")
                } else {
                    format!("{base}${suffix}${random}")
                }
            }
        }
    }
}

/// A short random alphanumeric string for synthetic names.
pub(crate) fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LENGTH)
        .map(char::from)
        .collect()
}

use crate::config;
use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        $(#[$meta])*
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Severity {
    Low => "Low",
    Medium => "Medium",
    High => "High",
});

str_enum!(
    #[serde(rename_all = "lowercase")]
    Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
);

impl Severity {
    /// Map a 0–10 daily score to a severity band.
    ///
    /// `<= 3` is Low, `4..=7` is Medium, `>= 8` is High.
    pub fn from_score(score: u8) -> Self {
        if score <= config::LOW_SEVERITY_MAX_SCORE {
            Severity::Low
        } else if score <= config::MEDIUM_SEVERITY_MAX_SCORE {
            Severity::Medium
        } else {
            Severity::High
        }
    }

    /// Ordinal used when ranking severities (Low=1 .. High=3).
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
        }
    }
}

impl Priority {
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }
}

impl From<Severity> for Priority {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Low => Priority::Low,
            Severity::Medium => Priority::Medium,
            Severity::High => Priority::High,
        }
    }
}

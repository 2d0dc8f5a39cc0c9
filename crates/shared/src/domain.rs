use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! wire_enum {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Simulated hardware input selecting an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    RingRotateCw,
    #[default]
    ThumbPress,
    ConsoleDial1Press,
}

wire_enum!(Gesture {
    RingRotateCw => "ring_rotate_cw",
    ThumbPress => "thumb_press",
    ConsoleDial1Press => "console_dial1_press",
});

impl Gesture {
    pub fn label(self) -> &'static str {
        match self {
            Gesture::RingRotateCw => "Ring Rotate",
            Gesture::ThumbPress => "Thumb Press",
            Gesture::ConsoleDial1Press => "Console Dial",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Gesture::RingRotateCw => "Scroll or cycle options",
            Gesture::ThumbPress => "Primary action / Select",
            Gesture::ConsoleDial1Press => "Secondary adjustment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    RefactorTelehealth,
    PatientApi,
    #[default]
    HealthDashboard,
}

wire_enum!(Command {
    RefactorTelehealth => "refactor_telehealth",
    PatientApi => "patient_api",
    HealthDashboard => "health_dashboard",
});

impl Command {
    pub fn label(self) -> &'static str {
        match self {
            Command::RefactorTelehealth => "Refactor Telehealth",
            Command::PatientApi => "Patient API",
            Command::HealthDashboard => "Health Dashboard",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Command::RefactorTelehealth => "Optimize existing RN code",
            Command::PatientApi => "Generate fetch/post logic",
            Command::HealthDashboard => "Create vitals visualization",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CodeInsert,
    Notification,
}

wire_enum!(Action {
    CodeInsert => "code_insert",
    Notification => "notification",
});

/// Vibration pattern hint for the consuming device. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HapticFeedback {
    ShortVibrate,
    LongPulse,
    None,
}

wire_enum!(HapticFeedback {
    ShortVibrate => "short_vibrate",
    LongPulse => "long_pulse",
    None => "none",
});

impl HapticFeedback {
    pub fn is_silent(self) -> bool {
        self == HapticFeedback::None
    }
}

//! Fixed option lists offered by the form

use serde::{Deserialize, Serialize};

/// Declares a closed set of form options with their display labels.
///
/// The label is both the wire value and the category level seen by the
/// preprocessor.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every option, in display order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Option whose label is exactly `label`
            pub fn from_label(label: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|option| option.as_str() == label)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_enum! {
    Gender {
        Male => "Male",
        Female => "Female",
        Other => "Other",
    }
}

choice_enum! {
    Location {
        India => "India",
        UnitedStates => "United States",
        Germany => "Germany",
        Indonesia => "Indonesia",
        Brazil => "Brazil",
        Japan => "Japan",
        Mexico => "Mexico",
        Philippines => "Philippines",
        Pakistan => "Pakistan",
        Vietnam => "Vietnam",
    }
}

choice_enum! {
    Platform {
        YouTube => "YouTube",
        Facebook => "Facebook",
        Instagram => "Instagram",
        TikTok => "TikTok",
    }
}

choice_enum! {
    VideoCategory {
        Gaming => "Gaming",
        Comedy => "Comedy",
        Vlogs => "Vlogs",
        Entertainment => "Entertainment",
        Asmr => "ASMR",
        Trends => "Trends",
        Pranks => "Pranks",
        LifeHacks => "Life Hacks",
        JokesMemes => "Jokes/Memes",
    }
}

choice_enum! {
    Engagement {
        High => "high",
        Moderate => "moderate",
        Less => "less",
    }
}

choice_enum! {
    Frequency {
        Morning => "Morning",
        Afternoon => "Afternoon",
        Evening => "Evening",
        Night => "Night",
    }
}

choice_enum! {
    WatchReason {
        Entertainment => "Entertainment",
        Procrastination => "Procrastination",
        Boredom => "Boredom",
        Habit => "Habit",
    }
}

/// Watch times offered by the form's dropdown
pub const WATCH_TIMES: &[&str] = &[
    "8:00 AM", "9:15 AM", "3:45 PM", "5:00 PM", "6:05 PM",
    "7:25 PM", "8:30 PM", "9:00 PM", "10:15 PM", "11:30 PM",
];

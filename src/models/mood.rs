use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of moods an entry can be tagged with.
///
/// The serialized form is the lowercase variant name (`"happy"`). The emoji
/// glyph is display data only; `from_emoji` exists so documents written by
/// older clients, which stored the glyph, can still be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodCategory {
    Happy,
    Joyful,
    Excited,
    Content,
    Calm,
    Relaxed,
    Proud,
    Hopeful,
    Grateful,
    Cheerful,
    Sad,
    Anxious,
    Angry,
    Irritable,
    Depressed,
    Frustrated,
    Guilty,
    Ashamed,
    Lonely,
    Hopeless,
    Indifferent,
    Confused,
    Nostalgic,
    Curious,
    Reflective,
    Tense,
    Tired,
    Bored,
    Distracted,
    Stressed,
}

impl MoodCategory {
    pub const ALL: [MoodCategory; 30] = [
        Self::Happy,
        Self::Joyful,
        Self::Excited,
        Self::Content,
        Self::Calm,
        Self::Relaxed,
        Self::Proud,
        Self::Hopeful,
        Self::Grateful,
        Self::Cheerful,
        Self::Sad,
        Self::Anxious,
        Self::Angry,
        Self::Irritable,
        Self::Depressed,
        Self::Frustrated,
        Self::Guilty,
        Self::Ashamed,
        Self::Lonely,
        Self::Hopeless,
        Self::Indifferent,
        Self::Confused,
        Self::Nostalgic,
        Self::Curious,
        Self::Reflective,
        Self::Tense,
        Self::Tired,
        Self::Bored,
        Self::Distracted,
        Self::Stressed,
    ];

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Happy => "😊",
            Self::Joyful => "😄",
            Self::Excited => "🤩",
            Self::Content => "🙂",
            Self::Calm => "😌",
            Self::Relaxed => "🧘\u{200d}♀\u{fe0f}",
            Self::Proud => "😎",
            Self::Hopeful => "🌟",
            Self::Grateful => "🙏",
            Self::Cheerful => "😁",
            Self::Sad => "😢",
            Self::Anxious => "😰",
            Self::Angry => "😡",
            Self::Irritable => "😤",
            Self::Depressed => "😞",
            Self::Frustrated => "😩",
            Self::Guilty => "😔",
            Self::Ashamed => "😳",
            Self::Lonely => "😕",
            Self::Hopeless => "😖",
            Self::Indifferent => "😐",
            Self::Confused => "🤔",
            Self::Nostalgic => "🥺",
            Self::Curious => "🤨",
            Self::Reflective => "🤯",
            Self::Tense => "😬",
            Self::Tired => "😴",
            Self::Bored => "😒",
            Self::Distracted => "😵",
            Self::Stressed => "😫",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Happy => "Happy",
            Self::Joyful => "Joyful",
            Self::Excited => "Excited",
            Self::Content => "Content",
            Self::Calm => "Calm",
            Self::Relaxed => "Relaxed",
            Self::Proud => "Proud",
            Self::Hopeful => "Hopeful",
            Self::Grateful => "Grateful",
            Self::Cheerful => "Cheerful",
            Self::Sad => "Sad",
            Self::Anxious => "Anxious",
            Self::Angry => "Angry",
            Self::Irritable => "Irritable",
            Self::Depressed => "Depressed",
            Self::Frustrated => "Frustrated",
            Self::Guilty => "Guilty",
            Self::Ashamed => "Ashamed",
            Self::Lonely => "Lonely",
            Self::Hopeless => "Hopeless",
            Self::Indifferent => "Indifferent",
            Self::Confused => "Confused",
            Self::Nostalgic => "Nostalgic",
            Self::Curious => "Curious",
            Self::Reflective => "Reflective",
            Self::Tense => "Tense",
            Self::Tired => "Tired",
            Self::Bored => "Bored",
            Self::Distracted => "Distracted",
            Self::Stressed => "Stressed",
        }
    }

    /// Canonical wire key, e.g. `"happy"`.
    pub fn key(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Joyful => "joyful",
            Self::Excited => "excited",
            Self::Content => "content",
            Self::Calm => "calm",
            Self::Relaxed => "relaxed",
            Self::Proud => "proud",
            Self::Hopeful => "hopeful",
            Self::Grateful => "grateful",
            Self::Cheerful => "cheerful",
            Self::Sad => "sad",
            Self::Anxious => "anxious",
            Self::Angry => "angry",
            Self::Irritable => "irritable",
            Self::Depressed => "depressed",
            Self::Frustrated => "frustrated",
            Self::Guilty => "guilty",
            Self::Ashamed => "ashamed",
            Self::Lonely => "lonely",
            Self::Hopeless => "hopeless",
            Self::Indifferent => "indifferent",
            Self::Confused => "confused",
            Self::Nostalgic => "nostalgic",
            Self::Curious => "curious",
            Self::Reflective => "reflective",
            Self::Tense => "tense",
            Self::Tired => "tired",
            Self::Bored => "bored",
            Self::Distracted => "distracted",
            Self::Stressed => "stressed",
        }
    }

    /// "😊 Happy"
    pub fn combined_display(self) -> String {
        format!("{} {}", self.emoji(), self.label())
    }

    pub fn from_emoji(glyph: &str) -> Option<Self> {
        let glyph = glyph.trim();
        Self::ALL.into_iter().find(|m| m.emoji() == glyph).or_else(|| {
            // Some keyboards drop the variation selector on the meditation glyph.
            let stripped = glyph.trim_end_matches('\u{fe0f}');
            Self::ALL
                .into_iter()
                .find(|m| m.emoji().trim_end_matches('\u{fe0f}') == stripped)
        })
    }
}

impl fmt::Display for MoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mood category: {0}")]
pub struct UnknownMood(pub String);

impl FromStr for MoodCategory {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.key() == needle)
            .ok_or_else(|| UnknownMood(s.to_string()))
    }
}

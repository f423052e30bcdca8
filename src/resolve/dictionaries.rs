//! Word lists shared by mention finding, arrangement and resolution.
//!
//! Dictionaries are built once and shared read-only through an `Arc`; no
//! per-document state lives here.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Number {
    Singular,
    Plural,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Neutral,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Person {
    First,
    Second,
    #[default]
    Third,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Animacy {
    Animate,
    Inanimate,
    #[default]
    Unknown,
}

impl Number {
    pub fn agrees_with(self, other: Number) -> bool {
        self == Number::Unknown || other == Number::Unknown || self == other
    }
}

impl Gender {
    pub fn agrees_with(self, other: Gender) -> bool {
        self == Gender::Unknown || other == Gender::Unknown || self == other
    }
}

impl Animacy {
    pub fn agrees_with(self, other: Animacy) -> bool {
        self == Animacy::Unknown || other == Animacy::Unknown || self == other
    }
}

/// Grammatical features of one pronoun form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PronounClass {
    pub person: Person,
    #[serde(default)]
    pub number: Number,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub animacy: Animacy,
}

/// Lexical resources for coreference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dictionaries {
    /// Lowercased pronoun forms
    #[serde(default)]
    pronouns: BTreeMap<String, PronounClass>,
    /// NER tags naming animate entities
    #[serde(default)]
    animate_tags: BTreeSet<String>,
    /// NER tags naming inanimate entities
    #[serde(default)]
    inanimate_tags: BTreeSet<String>,
}

static ENGLISH: Lazy<Arc<Dictionaries>> = Lazy::new(|| Arc::new(Dictionaries::build_english()));

const ENGLISH_PRONOUNS: &[(&str, Person, Number, Gender, Animacy)] = &[
    ("i", Person::First, Number::Singular, Gender::Unknown, Animacy::Animate),
    ("me", Person::First, Number::Singular, Gender::Unknown, Animacy::Animate),
    ("my", Person::First, Number::Singular, Gender::Unknown, Animacy::Animate),
    ("mine", Person::First, Number::Singular, Gender::Unknown, Animacy::Animate),
    ("myself", Person::First, Number::Singular, Gender::Unknown, Animacy::Animate),
    ("we", Person::First, Number::Plural, Gender::Unknown, Animacy::Animate),
    ("us", Person::First, Number::Plural, Gender::Unknown, Animacy::Animate),
    ("our", Person::First, Number::Plural, Gender::Unknown, Animacy::Animate),
    ("ours", Person::First, Number::Plural, Gender::Unknown, Animacy::Animate),
    ("ourselves", Person::First, Number::Plural, Gender::Unknown, Animacy::Animate),
    ("you", Person::Second, Number::Unknown, Gender::Unknown, Animacy::Animate),
    ("your", Person::Second, Number::Unknown, Gender::Unknown, Animacy::Animate),
    ("yours", Person::Second, Number::Unknown, Gender::Unknown, Animacy::Animate),
    ("yourself", Person::Second, Number::Singular, Gender::Unknown, Animacy::Animate),
    ("yourselves", Person::Second, Number::Plural, Gender::Unknown, Animacy::Animate),
    ("he", Person::Third, Number::Singular, Gender::Male, Animacy::Animate),
    ("him", Person::Third, Number::Singular, Gender::Male, Animacy::Animate),
    ("his", Person::Third, Number::Singular, Gender::Male, Animacy::Animate),
    ("himself", Person::Third, Number::Singular, Gender::Male, Animacy::Animate),
    ("she", Person::Third, Number::Singular, Gender::Female, Animacy::Animate),
    ("her", Person::Third, Number::Singular, Gender::Female, Animacy::Animate),
    ("hers", Person::Third, Number::Singular, Gender::Female, Animacy::Animate),
    ("herself", Person::Third, Number::Singular, Gender::Female, Animacy::Animate),
    ("it", Person::Third, Number::Singular, Gender::Neutral, Animacy::Inanimate),
    ("its", Person::Third, Number::Singular, Gender::Neutral, Animacy::Inanimate),
    ("itself", Person::Third, Number::Singular, Gender::Neutral, Animacy::Inanimate),
    ("they", Person::Third, Number::Plural, Gender::Unknown, Animacy::Unknown),
    ("them", Person::Third, Number::Plural, Gender::Unknown, Animacy::Unknown),
    ("their", Person::Third, Number::Plural, Gender::Unknown, Animacy::Unknown),
    ("theirs", Person::Third, Number::Plural, Gender::Unknown, Animacy::Unknown),
    ("themselves", Person::Third, Number::Plural, Gender::Unknown, Animacy::Unknown),
];

const ANIMATE_TAGS: &[&str] = &["PERSON"];

const INANIMATE_TAGS: &[&str] = &[
    "ORGANIZATION",
    "LOCATION",
    "MISC",
    "DATE",
    "TIME",
    "MONEY",
    "PERCENT",
    "NUMBER",
];

impl Dictionaries {
    /// Built-in English dictionaries, shared by every caller.
    pub fn english() -> Arc<Self> {
        ENGLISH.clone()
    }

    fn build_english() -> Self {
        let pronouns = ENGLISH_PRONOUNS
            .iter()
            .map(|&(word, person, number, gender, animacy)| {
                (
                    word.to_string(),
                    PronounClass {
                        person,
                        number,
                        gender,
                        animacy,
                    },
                )
            })
            .collect();
        Self {
            pronouns,
            animate_tags: ANIMATE_TAGS.iter().map(|t| t.to_string()).collect(),
            inanimate_tags: INANIMATE_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Load dictionaries from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Dictionaries {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|e| ConfigError::Dictionaries {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let mut dictionaries: Self = toml::from_str(content)?;
        dictionaries.pronouns = dictionaries
            .pronouns
            .into_iter()
            .map(|(word, class)| (word.to_lowercase(), class))
            .collect();
        Ok(dictionaries)
    }

    pub fn pronoun(&self, word: &str) -> Option<&PronounClass> {
        self.pronouns.get(&word.to_lowercase())
    }

    pub fn is_pronoun(&self, word: &str) -> bool {
        self.pronoun(word).is_some()
    }

    /// Animacy implied by a named-entity tag.
    pub fn entity_animacy(&self, tag: &str) -> Animacy {
        if self.animate_tags.contains(tag) {
            Animacy::Animate
        } else if self.inanimate_tags.contains(tag) {
            Animacy::Inanimate
        } else {
            Animacy::Unknown
        }
    }

    pub fn pronoun_count(&self) -> usize {
        self.pronouns.len()
    }
}

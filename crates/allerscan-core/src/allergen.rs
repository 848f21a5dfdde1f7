// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Allergen identifiers and the user's allergen selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An allergen the user wants to avoid.
///
/// Canonical allergens carry three distinct spellings: the stable wire id
/// (`tree-nuts`), the backend flag key (`tree_nuts`), and a display label
/// (`Tree Nuts`). Anything else is carried verbatim as a custom allergen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AllergenId {
    Peanuts,
    TreeNuts,
    Shellfish,
    Fish,
    Gluten,
    Dairy,
    Eggs,
    Soy,
    Sesame,
    Sulfites,
    Mustard,
    Celery,
    Lupin,
    Mollusks,
    Custom(String),
}

impl AllergenId {
    /// Every canonical allergen, in the order the backend flag map is read.
    pub const CANONICAL: [AllergenId; 14] = [
        AllergenId::Peanuts,
        AllergenId::TreeNuts,
        AllergenId::Shellfish,
        AllergenId::Fish,
        AllergenId::Gluten,
        AllergenId::Dairy,
        AllergenId::Eggs,
        AllergenId::Soy,
        AllergenId::Sesame,
        AllergenId::Sulfites,
        AllergenId::Mustard,
        AllergenId::Celery,
        AllergenId::Lupin,
        AllergenId::Mollusks,
    ];

    /// Stable wire identifier.
    pub fn id(&self) -> &str {
        match self {
            Self::Peanuts => "peanuts",
            Self::TreeNuts => "tree-nuts",
            Self::Shellfish => "shellfish",
            Self::Fish => "fish",
            Self::Gluten => "gluten",
            Self::Dairy => "dairy",
            Self::Eggs => "eggs",
            Self::Soy => "soy",
            Self::Sesame => "sesame",
            Self::Sulfites => "sulfites",
            Self::Mustard => "mustard",
            Self::Celery => "celery",
            Self::Lupin => "lupin",
            Self::Mollusks => "mollusks",
            Self::Custom(name) => name,
        }
    }

    /// Key of the boolean flag in the backend allergen record.
    /// Custom allergens travel in `custom_allergens` instead.
    pub fn flag_key(&self) -> Option<&'static str> {
        let key = match self {
            Self::Peanuts => "peanuts",
            Self::TreeNuts => "tree_nuts",
            Self::Shellfish => "shellfish",
            Self::Fish => "fish",
            Self::Gluten => "gluten",
            Self::Dairy => "dairy",
            Self::Eggs => "eggs",
            Self::Soy => "soy",
            Self::Sesame => "sesame",
            Self::Sulfites => "sulfites",
            Self::Mustard => "mustard",
            Self::Celery => "celery",
            Self::Lupin => "lupin",
            Self::Mollusks => "mollusks",
            Self::Custom(_) => return None,
        };
        Some(key)
    }

    /// Human-readable label for pickers and result chips.
    pub fn label(&self) -> &str {
        match self {
            Self::Peanuts => "Peanuts",
            Self::TreeNuts => "Tree Nuts",
            Self::Shellfish => "Shellfish",
            Self::Fish => "Fish",
            Self::Gluten => "Gluten",
            Self::Dairy => "Dairy",
            Self::Eggs => "Eggs",
            Self::Soy => "Soy",
            Self::Sesame => "Sesame",
            Self::Sulfites => "Sulfites",
            Self::Mustard => "Mustard",
            Self::Celery => "Celery",
            Self::Lupin => "Lupin",
            Self::Mollusks => "Mollusks",
            Self::Custom(name) => name,
        }
    }

    /// Parse a wire id. Unknown ids become custom allergens.
    pub fn from_id(id: &str) -> Self {
        let id = id.trim();
        Self::CANONICAL
            .iter()
            .find(|c| c.id() == id)
            .cloned()
            .unwrap_or_else(|| Self::Custom(id.to_owned()))
    }

    /// Canonical allergen for a backend flag key.
    pub fn from_flag_key(key: &str) -> Option<Self> {
        Self::CANONICAL
            .iter()
            .find(|c| c.flag_key() == Some(key))
            .cloned()
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl From<String> for AllergenId {
    fn from(value: String) -> Self {
        Self::from_id(&value)
    }
}

impl From<AllergenId> for String {
    fn from(value: AllergenId) -> Self {
        match value {
            AllergenId::Custom(name) => name,
            other => other.id().to_owned(),
        }
    }
}

impl fmt::Display for AllergenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The user's allergen selection.
///
/// Behaves as a set (no duplicates, equality ignores order) while keeping
/// insertion order for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<AllergenId>", into = "Vec<AllergenId>")]
pub struct AllergenSet {
    items: Vec<AllergenId>,
}

impl AllergenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an allergen. Returns false if it was already present or is an
    /// empty custom name.
    pub fn insert(&mut self, allergen: AllergenId) -> bool {
        if let AllergenId::Custom(name) = &allergen
            && name.trim().is_empty()
        {
            return false;
        }
        if self.contains(&allergen) {
            return false;
        }
        self.items.push(allergen);
        true
    }

    /// Remove an allergen. Returns whether it was present.
    pub fn remove(&mut self, allergen: &AllergenId) -> bool {
        let before = self.items.len();
        self.items.retain(|a| a != allergen);
        self.items.len() != before
    }

    /// Flip membership, as the onboarding and settings pickers do.
    pub fn toggle(&mut self, allergen: AllergenId) {
        if !self.remove(&allergen) {
            self.insert(allergen);
        }
    }

    pub fn contains(&self, allergen: &AllergenId) -> bool {
        self.items.iter().any(|a| a == allergen)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AllergenId> {
        self.items.iter()
    }

    /// Custom (non-canonical) entries, in insertion order.
    pub fn custom_names(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|a| a.is_custom())
            .map(|a| a.id().to_owned())
            .collect()
    }
}

impl PartialEq for AllergenSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.items.iter().all(|a| other.contains(a))
    }
}

impl Eq for AllergenSet {}

impl FromIterator<AllergenId> for AllergenSet {
    fn from_iter<T: IntoIterator<Item = AllergenId>>(iter: T) -> Self {
        let mut set = Self::new();
        for allergen in iter {
            set.insert(allergen);
        }
        set
    }
}

impl From<Vec<AllergenId>> for AllergenSet {
    fn from(value: Vec<AllergenId>) -> Self {
        value.into_iter().collect()
    }
}

impl From<AllergenSet> for Vec<AllergenId> {
    fn from(value: AllergenSet) -> Self {
        value.items
    }
}

//! The nine ITC2021 constraint categories and their attribute defaults.
//!
//! Capacity constraints (CA1-CA4), game constraints (GA1), break constraints
//! (BR1, BR2), fairness (FA2) and separation (SE1). Each category lists its
//! scalar parameters in emission order, with the value used when the
//! attribute is absent, and its list-valued attributes with their grammar.

use crate::lists::Grammar::{self, Pairs, Plain, RangeOrList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// HARD/SOFT, emitted lower-cased.
    Polarity,
    /// Emitted verbatim, unquoted.
    Number,
    /// Emitted in double quotes.
    Text,
}

#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct ListAttr {
    pub name: &'static str,
    pub grammar: Grammar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    CA1,
    CA2,
    CA3,
    CA4,
    GA1,
    BR1,
    BR2,
    FA2,
    SE1,
}

const fn polarity(default: &'static str) -> Param {
    Param { name: "type", kind: ParamKind::Polarity, default }
}

const fn number(name: &'static str, default: &'static str) -> Param {
    Param { name, kind: ParamKind::Number, default }
}

const fn text(name: &'static str, default: &'static str) -> Param {
    Param { name, kind: ParamKind::Text, default }
}

const fn list(name: &'static str, grammar: Grammar) -> ListAttr {
    ListAttr { name, grammar }
}

const CA1_PARAMS: &[Param] = &[
    polarity("HARD"),
    number("max", "0"),
    number("min", "0"),
    text("mode", "H"),
    number("penalty", "1"),
];
const CA1_LISTS: &[ListAttr] = &[list("teams", RangeOrList), list("slots", Plain)];

const CA2_PARAMS: &[Param] = &[
    polarity("HARD"),
    number("max", "0"),
    number("min", "0"),
    text("mode1", "H"),
    text("mode2", "GLOBAL"),
    number("penalty", "1"),
];
const CA2_LISTS: &[ListAttr] = &[
    list("teams1", RangeOrList),
    list("teams2", RangeOrList),
    list("slots", Plain),
];

const CA3_PARAMS: &[Param] = &[
    polarity("HARD"),
    number("max", "0"),
    number("min", "0"),
    text("mode1", "H"),
    text("mode2", "SLOTS"),
    number("intp", "1"),
    number("penalty", "1"),
];
const CA3_LISTS: &[ListAttr] = &[list("teams1", RangeOrList), list("teams2", RangeOrList)];

const CA4_PARAMS: &[Param] = CA2_PARAMS;
const CA4_LISTS: &[ListAttr] = CA2_LISTS;

const GA1_PARAMS: &[Param] = &[
    polarity("HARD"),
    number("max", "1"),
    number("min", "0"),
    number("penalty", "1"),
];
const GA1_LISTS: &[ListAttr] = &[list("meetings", Pairs), list("slots", Plain)];

const BR1_PARAMS: &[Param] = &[
    polarity("HARD"),
    number("intp", "0"),
    text("mode1", "LEQ"),
    text("mode2", "HA"),
    number("penalty", "1"),
];
const BR1_LISTS: &[ListAttr] = &[list("teams", RangeOrList), list("slots", Plain)];

const BR2_PARAMS: &[Param] = &[
    polarity("HARD"),
    number("intp", "0"),
    text("homeMode", "HA"),
    text("mode2", "LEQ"),
    number("penalty", "1"),
];
const BR2_LISTS: &[ListAttr] = &[list("teams", RangeOrList), list("slots", RangeOrList)];

// Fairness and separation are soft unless stated otherwise.
const FA2_PARAMS: &[Param] = &[polarity("SOFT"), number("intp", "1"), number("penalty", "1")];
const FA2_LISTS: &[ListAttr] = &[list("teams", RangeOrList), list("slots", RangeOrList)];

const SE1_PARAMS: &[Param] = &[polarity("SOFT"), number("min", "1"), number("penalty", "1")];
const SE1_LISTS: &[ListAttr] = &[list("teams", RangeOrList)];

impl Category {
    /// All categories in the order their facts are emitted.
    pub const ALL: [Category; 9] = [
        Category::CA1,
        Category::CA2,
        Category::CA3,
        Category::CA4,
        Category::GA1,
        Category::BR1,
        Category::BR2,
        Category::FA2,
        Category::SE1,
    ];

    /// XML element name.
    pub fn tag(self) -> &'static str {
        match self {
            Category::CA1 => "CA1",
            Category::CA2 => "CA2",
            Category::CA3 => "CA3",
            Category::CA4 => "CA4",
            Category::GA1 => "GA1",
            Category::BR1 => "BR1",
            Category::BR2 => "BR2",
            Category::FA2 => "FA2",
            Category::SE1 => "SE1",
        }
    }

    /// Predicate prefix, also used for record identifiers (`ca1_3`).
    pub fn prefix(self) -> &'static str {
        match self {
            Category::CA1 => "ca1",
            Category::CA2 => "ca2",
            Category::CA3 => "ca3",
            Category::CA4 => "ca4",
            Category::GA1 => "ga1",
            Category::BR1 => "br1",
            Category::BR2 => "br2",
            Category::FA2 => "fa2",
            Category::SE1 => "se1",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Category::CA1 => "capacity",
            Category::CA2 => "capacity vs opponent set",
            Category::CA3 => "consecutive games",
            Category::CA4 => "group capacity",
            Category::GA1 => "game assignment",
            Category::BR1 => "breaks per team",
            Category::BR2 => "global breaks",
            Category::FA2 => "fairness",
            Category::SE1 => "separation",
        }
    }

    pub fn params(self) -> &'static [Param] {
        match self {
            Category::CA1 => CA1_PARAMS,
            Category::CA2 => CA2_PARAMS,
            Category::CA3 => CA3_PARAMS,
            Category::CA4 => CA4_PARAMS,
            Category::GA1 => GA1_PARAMS,
            Category::BR1 => BR1_PARAMS,
            Category::BR2 => BR2_PARAMS,
            Category::FA2 => FA2_PARAMS,
            Category::SE1 => SE1_PARAMS,
        }
    }

    pub fn lists(self) -> &'static [ListAttr] {
        match self {
            Category::CA1 => CA1_LISTS,
            Category::CA2 => CA2_LISTS,
            Category::CA3 => CA3_LISTS,
            Category::CA4 => CA4_LISTS,
            Category::GA1 => GA1_LISTS,
            Category::BR1 => BR1_LISTS,
            Category::BR2 => BR2_LISTS,
            Category::FA2 => FA2_LISTS,
            Category::SE1 => SE1_LISTS,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.tag() == tag)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_of(category: Category, name: &str) -> &'static str {
        category.params().iter().find(|p| p.name == name).unwrap().default
    }

    #[test]
    fn every_category_starts_with_type_and_ends_with_penalty() {
        for c in Category::ALL.iter().copied() {
            let params = c.params();
            assert_eq!(params[0].name, "type", "{}", c);
            assert_eq!(params[0].kind, ParamKind::Polarity);
            assert_eq!(params.last().unwrap().name, "penalty", "{}", c);
            assert_eq!(params.last().unwrap().default, "1");
        }
    }

    #[test]
    fn polarity_defaults() {
        for c in Category::ALL.iter().copied() {
            let expected = match c {
                Category::FA2 | Category::SE1 => "SOFT",
                _ => "HARD",
            };
            assert_eq!(default_of(c, "type"), expected, "{}", c);
        }
    }

    #[test]
    fn category_specific_defaults() {
        assert_eq!(default_of(Category::GA1, "max"), "1");
        assert_eq!(default_of(Category::CA1, "max"), "0");
        assert_eq!(default_of(Category::CA3, "mode2"), "SLOTS");
        assert_eq!(default_of(Category::CA3, "intp"), "1");
        assert_eq!(default_of(Category::BR1, "mode1"), "LEQ");
        assert_eq!(default_of(Category::BR2, "homeMode"), "HA");
        assert_eq!(default_of(Category::BR2, "mode2"), "LEQ");
        assert_eq!(default_of(Category::SE1, "min"), "1");
    }

    #[test]
    fn list_grammars() {
        let grammar = |c: Category, name: &str| c.lists().iter().find(|l| l.name == name).unwrap().grammar;
        assert_eq!(grammar(Category::CA1, "slots"), Grammar::Plain);
        assert_eq!(grammar(Category::BR2, "slots"), Grammar::RangeOrList);
        assert_eq!(grammar(Category::FA2, "slots"), Grammar::RangeOrList);
        assert_eq!(grammar(Category::GA1, "meetings"), Grammar::Pairs);
        assert!(Category::SE1.lists().iter().all(|l| l.name != "slots"));
    }

    #[test]
    fn tags_round_trip() {
        for c in Category::ALL.iter().copied() {
            assert_eq!(Category::from_tag(c.tag()), Some(c));
        }
        assert_eq!(Category::from_tag("CA5"), None);
    }
}

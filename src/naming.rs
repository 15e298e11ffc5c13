//! Identifier casing and inflection for model, property, and file names.

use std::str::FromStr;

use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase,
};
use inflector::Inflector;

use crate::error::RelgenError;

/// How a database identifier is recased into a generated name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseStyle {
    /// `c`: camelCase
    Camel,
    /// `k`: kebab-case
    Kebab,
    /// `l`: lower snake_case
    Lower,
    /// `o`: leave as-is
    #[default]
    Original,
    /// `p`: PascalCase
    Pascal,
    /// `s`: snake_case
    Snake,
    /// `u`: UPPER_SNAKE_CASE
    Upper,
}

impl FromStr for CaseStyle {
    type Err = RelgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "c" | "camel" => Ok(CaseStyle::Camel),
            "k" | "kebab" => Ok(CaseStyle::Kebab),
            "l" | "lower" => Ok(CaseStyle::Lower),
            "o" | "original" => Ok(CaseStyle::Original),
            "p" | "pascal" => Ok(CaseStyle::Pascal),
            "s" | "snake" => Ok(CaseStyle::Snake),
            "u" | "upper" => Ok(CaseStyle::Upper),
            other => Err(RelgenError::UnknownCase(other.to_string())),
        }
    }
}

/// Recase `name`, singularizing it first when asked.
pub fn recase(style: CaseStyle, name: &str, singular: bool) -> String {
    let name = if singular && !name.is_empty() {
        singularize(name)
    } else {
        name.to_string()
    };
    match style {
        CaseStyle::Original => name,
        CaseStyle::Camel => name.to_lower_camel_case(),
        CaseStyle::Pascal => name.to_upper_camel_case(),
        CaseStyle::Lower | CaseStyle::Snake => name.to_snake_case(),
        CaseStyle::Upper => name.to_shouty_snake_case(),
        CaseStyle::Kebab => name.to_kebab_case(),
    }
}

/// Irregular plurals the inflector gets wrong for table names.
static IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("half", "halves"),
    ("hero", "heroes"),
    ("analysis", "analyses"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("medium", "media"),
    ("index", "indices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
];

/// Pluralize the last word of an identifier, keeping its prefix and casing:
/// `order_status` becomes `order_statuses`, `Person` becomes `People`.
pub fn pluralize(word: &str) -> String {
    inflect_last_word(word, plural_word)
}

/// Singularize the last word of an identifier, keeping its prefix and casing:
/// `user_statuses` becomes `user_status`, `orderItems` becomes `orderItem`.
pub fn singularize(word: &str) -> String {
    inflect_last_word(word, singular_word)
}

fn plural_word(lower: &str) -> String {
    for (singular, plural) in IRREGULAR_PLURALS {
        if lower == *singular || lower == *plural {
            return plural.to_string();
        }
    }
    if lower.ends_with("us") {
        return format!("{lower}es");
    }
    lower.to_plural()
}

fn singular_word(lower: &str) -> String {
    for (singular, plural) in IRREGULAR_PLURALS {
        if lower == *plural || lower == *singular {
            return singular.to_string();
        }
    }
    // status, campus, address: already singular
    if lower.ends_with("us") || lower.ends_with("ss") {
        return lower.to_string();
    }
    if let Some(stem) = lower.strip_suffix("uses") {
        return format!("{stem}us");
    }
    lower.to_singular()
}

/// Apply `inflect` to the lowercased last word and splice it back.
fn inflect_last_word(word: &str, inflect: fn(&str) -> String) -> String {
    let (prefix, last) = split_last_word(word);
    if last.is_empty() {
        return word.to_string();
    }
    let inflected = inflect(&last.to_lowercase());
    format!("{prefix}{}", match_case(last, &inflected))
}

/// Split before the last word, at a `_`, `-` or space separator or at a
/// lower-to-upper case boundary.
fn split_last_word(word: &str) -> (&str, &str) {
    let mut start = 0;
    let mut prev: Option<char> = None;
    for (i, c) in word.char_indices() {
        if matches!(c, '_' | '-' | ' ') {
            start = i + c.len_utf8();
        } else if c.is_uppercase()
            && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit())
        {
            start = i;
        }
        prev = Some(c);
    }
    word.split_at(start)
}

fn match_case(original: &str, word: &str) -> String {
    let mut letters = original.chars().filter(|c| c.is_alphabetic());
    let first_upper = original.chars().next().is_some_and(char::is_uppercase);
    if original.chars().count() > 1 && letters.all(char::is_uppercase) {
        return word.to_uppercase();
    }
    if first_upper {
        let mut chars = word.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }
    word.to_string()
}

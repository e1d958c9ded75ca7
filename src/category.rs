//! Category taxonomy and the per-category predicates.
//!
//! A [`Category`] is a tagged value; its label is only a rendering of the tag.
//! Labels coming back from the presentation layer are parsed into a tag first
//! and judged second, so an unrecognised label is simply a wrong answer.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::number_format::{is_number_word, to_expanded_form, to_words};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parity {
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primality {
    Prime,
    Composite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    GreaterThan,
    LessThan,
    EqualTo,
}

/// Named collection of categories, shown as one block in the game screen.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryGroup {
    #[strum(to_string = "Basic Properties")]
    BasicProperties,
    #[strum(to_string = "Multiples")]
    Multiples,
    #[strum(to_string = "Comparisons")]
    Comparisons,
    #[strum(to_string = "Rounding")]
    Rounding,
    #[strum(to_string = "Written Form")]
    WrittenForm,
    #[strum(to_string = "Expanded Form")]
    ExpandedForm,
}

impl CategoryGroup {
    /// Every group, in the order the game lays them out.
    pub const ALL: [CategoryGroup; 6] = [
        CategoryGroup::BasicProperties,
        CategoryGroup::Multiples,
        CategoryGroup::Comparisons,
        CategoryGroup::Rounding,
        CategoryGroup::WrittenForm,
        CategoryGroup::ExpandedForm,
    ];

    /// Groups whose single member is recomputed from each round's number.
    pub fn is_dynamic(self) -> bool {
        matches!(self, CategoryGroup::WrittenForm | CategoryGroup::ExpandedForm)
    }

    /// Fixed members of the group. Empty for dynamic groups.
    pub fn static_categories(self) -> Vec<Category> {
        match self {
            CategoryGroup::BasicProperties => vec![
                Category::Parity(Parity::Even),
                Category::Parity(Parity::Odd),
                Category::Primality(Primality::Prime),
                Category::Primality(Primality::Composite),
                Category::Square,
            ],
            CategoryGroup::Multiples => (3..=8).map(Category::MultipleOf).collect(),
            CategoryGroup::Comparisons => [50, 100]
                .into_iter()
                .flat_map(|threshold| {
                    [
                        Category::Compare(Comparison::GreaterThan, threshold),
                        Category::Compare(Comparison::LessThan, threshold),
                        Category::Compare(Comparison::EqualTo, threshold),
                    ]
                })
                .collect(),
            CategoryGroup::Rounding => [10, 100, 1000]
                .into_iter()
                .map(Category::RoundsTo)
                .collect(),
            CategoryGroup::WrittenForm | CategoryGroup::ExpandedForm => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Parity(Parity),
    Primality(Primality),
    Square,
    MultipleOf(u32),
    Compare(Comparison, u32),
    RoundsTo(u32),
    /// Written-word form of one particular number, e.g. "twenty-four".
    WordForm(String),
    /// Expanded form of one particular number, e.g. "300 + 5".
    ExpandedForm(String),
}

impl Category {
    /// Parse a label back into its category.
    ///
    /// Literal labels and the parametric `Multiple of <k>`, `Greater than <k>`,
    /// `Less than <k>`, `Equal to <k>` and `Rounds to nearest <k>` forms are
    /// recognised first; then text shaped like an expanded form or like number
    /// words. A zero divisor makes the label unknown.
    pub fn parse(label: &str) -> Option<Category> {
        match label {
            "Even" => return Some(Category::Parity(Parity::Even)),
            "Odd" => return Some(Category::Parity(Parity::Odd)),
            "Prime" => return Some(Category::Primality(Primality::Prime)),
            "Composite" => return Some(Category::Primality(Primality::Composite)),
            "Square Number" => return Some(Category::Square),
            _ => {}
        }

        if let Some(k) = parse_suffix(label, "Multiple of ") {
            return (k > 0).then_some(Category::MultipleOf(k));
        }
        if let Some(k) = parse_suffix(label, "Rounds to nearest ") {
            return (k > 0).then_some(Category::RoundsTo(k));
        }
        if let Some(t) = parse_suffix(label, "Greater than ") {
            return Some(Category::Compare(Comparison::GreaterThan, t));
        }
        if let Some(t) = parse_suffix(label, "Less than ") {
            return Some(Category::Compare(Comparison::LessThan, t));
        }
        if let Some(t) = parse_suffix(label, "Equal to ") {
            return Some(Category::Compare(Comparison::EqualTo, t));
        }

        if looks_expanded(label) {
            Some(Category::ExpandedForm(label.to_string()))
        } else if looks_worded(label) {
            Some(Category::WordForm(label.to_string()))
        } else {
            None
        }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }

    pub fn group(&self) -> CategoryGroup {
        match self {
            Category::Parity(_) | Category::Primality(_) | Category::Square => {
                CategoryGroup::BasicProperties
            }
            Category::MultipleOf(_) => CategoryGroup::Multiples,
            Category::Compare(..) => CategoryGroup::Comparisons,
            Category::RoundsTo(_) => CategoryGroup::Rounding,
            Category::WordForm(_) => CategoryGroup::WrittenForm,
            Category::ExpandedForm(_) => CategoryGroup::ExpandedForm,
        }
    }

    /// Whether the category holds for `n`.
    pub fn holds(&self, n: u32) -> bool {
        match self {
            Category::Parity(Parity::Even) => n % 2 == 0,
            Category::Parity(Parity::Odd) => n % 2 != 0,
            Category::Primality(Primality::Prime) => is_prime(n),
            Category::Primality(Primality::Composite) => n > 1 && !is_prime(n),
            Category::Square => is_perfect_square(n),
            Category::MultipleOf(k) => *k != 0 && n % k == 0,
            Category::Compare(Comparison::GreaterThan, t) => n > *t,
            Category::Compare(Comparison::LessThan, t) => n < *t,
            Category::Compare(Comparison::EqualTo, t) => n == *t,
            Category::RoundsTo(k) => *k != 0 && round_to_nearest(n, *k) == n as u64,
            Category::WordForm(text) => *text == to_words(n),
            Category::ExpandedForm(text) => *text == to_expanded_form(n),
        }
    }

    /// Hover text pitched at a second-grade reader.
    pub fn explanation(&self) -> String {
        match self {
            Category::Parity(Parity::Even) => {
                "Numbers that can be divided by 2 with no leftovers.".into()
            }
            Category::Parity(Parity::Odd) => {
                "Numbers that have 1 left over when divided by 2.".into()
            }
            Category::Primality(Primality::Prime) => {
                "Numbers that can only be divided by 1 and themselves.".into()
            }
            Category::Primality(Primality::Composite) => {
                "Numbers that can be divided by more than just 1 and themselves.".into()
            }
            Category::Square => {
                "Numbers that are the result of multiplying a number by itself.".into()
            }
            Category::MultipleOf(k) => {
                format!("Numbers that can be divided by {} with no leftovers.", k)
            }
            Category::Compare(Comparison::GreaterThan, t) => {
                format!("Numbers that are bigger than {}.", t)
            }
            Category::Compare(Comparison::LessThan, t) => {
                format!("Numbers that are smaller than {}.", t)
            }
            Category::Compare(Comparison::EqualTo, t) => format!("The number is exactly {}.", t),
            Category::RoundsTo(k) => {
                let place = match k {
                    10 => "ten".to_string(),
                    100 => "hundred".to_string(),
                    1000 => "thousand".to_string(),
                    other => other.to_string(),
                };
                format!("When we round this number to the closest {}.", place)
            }
            Category::WordForm(_) => "How we say this number using words.".into(),
            Category::ExpandedForm(_) => {
                "Writing the number to show the value of each digit.".into()
            }
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Parity(Parity::Even) => write!(f, "Even"),
            Category::Parity(Parity::Odd) => write!(f, "Odd"),
            Category::Primality(Primality::Prime) => write!(f, "Prime"),
            Category::Primality(Primality::Composite) => write!(f, "Composite"),
            Category::Square => write!(f, "Square Number"),
            Category::MultipleOf(k) => write!(f, "Multiple of {}", k),
            Category::Compare(Comparison::GreaterThan, t) => write!(f, "Greater than {}", t),
            Category::Compare(Comparison::LessThan, t) => write!(f, "Less than {}", t),
            Category::Compare(Comparison::EqualTo, t) => write!(f, "Equal to {}", t),
            Category::RoundsTo(k) => write!(f, "Rounds to nearest {}", k),
            Category::WordForm(text) | Category::ExpandedForm(text) => f.write_str(text),
        }
    }
}

/// Judge `label` against `n`. Unknown labels are never correct.
pub fn classify(label: &str, n: u32) -> bool {
    Category::parse(label).is_some_and(|category| category.holds(n))
}

pub fn is_known(label: &str) -> bool {
    Category::parse(label).is_some()
}

pub fn explanation(label: &str) -> Option<String> {
    Category::parse(label).map(|category| category.explanation())
}

pub fn is_prime(n: u32) -> bool {
    let n = n as u64;
    n > 1 && (2u64..).take_while(|d| d * d <= n).all(|d| n % d != 0)
}

pub fn is_perfect_square(n: u32) -> bool {
    let n = n as u64;
    let root = (n as f64).sqrt() as u64;
    (root.saturating_sub(1)..=root + 1).any(|r| r * r == n)
}

// Half-up, matching how the game has always rounded.
fn round_to_nearest(n: u32, k: u32) -> u64 {
    let (n, k) = (n as u64, k as u64);
    ((2 * n + k) / (2 * k)) * k
}

fn parse_suffix(label: &str, prefix: &str) -> Option<u32> {
    let rest = label.strip_prefix(prefix)?;
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

fn looks_expanded(label: &str) -> bool {
    label.split(" + ").all(|term| {
        let mut digits = term.bytes();
        match digits.next() {
            Some(b'0') => term.len() == 1,
            Some(b'1'..=b'9') => digits.all(|b| b == b'0'),
            _ => false,
        }
    })
}

fn looks_worded(label: &str) -> bool {
    label.split([' ', '-']).all(is_number_word)
}

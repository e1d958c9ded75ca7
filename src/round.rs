use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::category::{Category, CategoryGroup};
use crate::number_format::{to_expanded_form, to_words};

/// Difficulty bands. A band is picked uniformly, then a number inside it, so
/// roughly two rounds in three stay at or below 200.
pub const TIERS: [RangeInclusive<u32>; 3] = [1..=100, 101..=200, 201..=500];

/// The two categories that only exist for one round's number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicCategories {
    pub word_form: Category,
    pub expanded_form: Category,
}

#[derive(Debug)]
pub struct RoundGenerator {
    rng: StdRng,
}

impl RoundGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence of rounds.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_number(&mut self) -> u32 {
        let tier = self.rng.gen_range(0..TIERS.len());
        self.rng.gen_range(TIERS[tier].clone())
    }

    pub fn dynamic_categories(n: u32) -> DynamicCategories {
        DynamicCategories {
            word_form: Category::WordForm(to_words(n)),
            expanded_form: Category::ExpandedForm(to_expanded_form(n)),
        }
    }

    pub fn next_round(&mut self, groups: &BTreeSet<CategoryGroup>) -> RoundState {
        RoundState::new(self.next_number(), groups)
    }
}

impl Default for RoundGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferedGroup {
    pub group: CategoryGroup,
    pub labels: Vec<String>,
}

/// One round: the number on screen, what is offered, and what is ticked.
#[derive(Debug, Clone)]
pub struct RoundState {
    number: u32,
    offered: Vec<(CategoryGroup, Vec<Category>)>,
    selected: BTreeSet<String>,
}

impl RoundState {
    /// Offers the enabled groups in their canonical order. Each enabled
    /// dynamic group contributes exactly one category built from `number`.
    pub fn new(number: u32, groups: &BTreeSet<CategoryGroup>) -> Self {
        let dynamic = RoundGenerator::dynamic_categories(number);
        let offered = CategoryGroup::ALL
            .into_iter()
            .filter(|group| groups.contains(group))
            .map(|group| {
                let categories = match group {
                    CategoryGroup::WrittenForm => vec![dynamic.word_form.clone()],
                    CategoryGroup::ExpandedForm => vec![dynamic.expanded_form.clone()],
                    _ => group.static_categories(),
                };
                (group, categories)
            })
            .collect();

        Self {
            number,
            offered,
            selected: BTreeSet::new(),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn offered(&self) -> &[(CategoryGroup, Vec<Category>)] {
        &self.offered
    }

    pub fn offered_groups(&self) -> Vec<OfferedGroup> {
        self.offered
            .iter()
            .map(|(group, categories)| OfferedGroup {
                group: *group,
                labels: categories.iter().map(Category::label).collect(),
            })
            .collect()
    }

    pub fn offered_categories(&self) -> impl Iterator<Item = &Category> {
        self.offered.iter().flat_map(|(_, categories)| categories.iter())
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, label: &str) -> bool {
        self.selected.contains(label)
    }

    /// Flip a label in or out of the selection; returns whether it is now
    /// selected.
    pub fn toggle(&mut self, label: &str) -> bool {
        if self.selected.remove(label) {
            false
        } else {
            self.selected.insert(label.to_string());
            true
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::classify;

    fn all_groups() -> BTreeSet<CategoryGroup> {
        CategoryGroup::ALL.into_iter().collect()
    }

    #[test]
    fn test_numbers_stay_in_range() {
        let mut generator = RoundGenerator::with_seed(7);
        for _ in 0..10_000 {
            let n = generator.next_number();
            assert!((1..=500).contains(&n), "{n} out of range");
        }
    }

    #[test]
    fn test_tiers_are_roughly_uniform() {
        let mut generator = RoundGenerator::with_seed(42);
        let mut counts = [0usize; 3];
        let draws = 10_000;
        for _ in 0..draws {
            let n = generator.next_number();
            let tier = TIERS.iter().position(|t| t.contains(&n)).unwrap();
            counts[tier] += 1;
        }
        for count in counts {
            let share = count as f64 / draws as f64;
            assert!((0.30..0.37).contains(&share), "share {share} off a third");
        }
    }

    #[test]
    fn test_seeded_generators_agree() {
        let mut a = RoundGenerator::with_seed(99);
        let mut b = RoundGenerator::with_seed(99);
        let xs: Vec<u32> = (0..20).map(|_| a.next_number()).collect();
        let ys: Vec<u32> = (0..20).map(|_| b.next_number()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_dynamic_categories_match_their_number() {
        let dynamic = RoundGenerator::dynamic_categories(305);
        assert_eq!(dynamic.word_form.label(), "three hundred five");
        assert_eq!(dynamic.expanded_form.label(), "300 + 5");
        assert!(dynamic.word_form.holds(305));
        assert!(!dynamic.word_form.holds(306));
        assert!(classify(&dynamic.expanded_form.label(), 305));
    }

    #[test]
    fn test_round_offers_one_member_per_dynamic_group() {
        let round = RoundState::new(24, &all_groups());
        let groups = round.offered_groups();
        assert_eq!(groups.len(), 6);

        let written = groups
            .iter()
            .find(|g| g.group == CategoryGroup::WrittenForm)
            .unwrap();
        assert_eq!(written.labels, vec!["twenty-four".to_string()]);
        let expanded = groups
            .iter()
            .find(|g| g.group == CategoryGroup::ExpandedForm)
            .unwrap();
        assert_eq!(expanded.labels, vec!["20 + 4".to_string()]);
    }

    #[test]
    fn test_round_respects_enabled_groups() {
        let groups: BTreeSet<_> = [CategoryGroup::Rounding, CategoryGroup::BasicProperties]
            .into_iter()
            .collect();
        let round = RoundState::new(10, &groups);
        let order: Vec<_> = round.offered().iter().map(|(g, _)| *g).collect();
        assert_eq!(
            order,
            vec![CategoryGroup::BasicProperties, CategoryGroup::Rounding]
        );
        assert_eq!(round.offered_categories().count(), 8);
    }

    #[test]
    fn test_toggle_selection() {
        let mut round = RoundState::new(12, &all_groups());
        assert!(round.toggle("Even"));
        assert!(round.is_selected("Even"));
        assert!(!round.toggle("Even"));
        assert!(round.selected().is_empty());

        round.toggle("Odd");
        round.toggle("Prime");
        round.clear_selection();
        assert!(round.selected().is_empty());
    }
}

//! Domain model for a destination section of a trip.
//!
//! A destination owns its activities and is the only place the budget ceiling
//! is enforced. Every activity mutation is all-or-nothing: if the ceiling check
//! fails the activity list is left untouched.

use serde::{Deserialize, Serialize};

use super::activity::{validate_name, Activity, DEFAULT_MAX_NAME_LENGTH};
use crate::domain::date_window::DateWindow;
use crate::domain::error::{PlannerError, PlannerResult};
use crate::domain::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    name: String,
    window: Option<DateWindow>,
    budget_ceiling: Option<Money>,
    activities: Vec<Activity>,
    notes: Option<String>,
}

/// Builder for [`Destination`]; nothing is constructed until [`build`](Self::build) validates it
#[derive(Debug, Clone)]
pub struct DestinationBuilder {
    name: String,
    max_name_length: usize,
    window: Option<DateWindow>,
    budget_ceiling: Option<Money>,
    activities: Vec<Activity>,
    notes: Option<String>,
}

impl DestinationBuilder {
    /// Override the name length limit, usually from the engine config
    pub fn max_name_length(mut self, max_name_length: usize) -> Self {
        self.max_name_length = max_name_length;
        self
    }

    pub fn window(mut self, window: DateWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn budget_ceiling(mut self, ceiling: Money) -> Self {
        self.budget_ceiling = Some(ceiling);
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn activity(mut self, activity: Activity) -> Self {
        self.activities.push(activity);
        self
    }

    /// Validate and build. Initial activities go through the same ceiling
    /// check as [`Destination::add_activity`].
    pub fn build(self) -> PlannerResult<Destination> {
        let name = validate_name(&self.name, self.max_name_length)?;
        if let Some(ceiling) = self.budget_ceiling {
            if ceiling.is_negative() {
                return Err(PlannerError::InvalidAmount(ceiling.to_plain_string()));
            }
        }
        let mut destination = Destination {
            name,
            window: self.window,
            budget_ceiling: self.budget_ceiling,
            activities: Vec::with_capacity(self.activities.len()),
            notes: normalize_notes(self.notes),
        };
        for activity in self.activities {
            destination.add_activity(activity)?;
        }
        Ok(destination)
    }
}

impl Destination {
    pub fn builder(name: &str) -> DestinationBuilder {
        DestinationBuilder {
            name: name.to_string(),
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            window: None,
            budget_ceiling: None,
            activities: Vec::new(),
            notes: None,
        }
    }

    /// Rebuild a destination from stored data without re-running the ceiling gate.
    ///
    /// Stored data may legitimately sit above its ceiling when the ceiling was
    /// lowered after the activities were planned. The name length limit is not
    /// re-applied either: it was enforced with the configured limit on write.
    pub(crate) fn restore(
        name: &str,
        window: Option<DateWindow>,
        budget_ceiling: Option<Money>,
        activities: Vec<Activity>,
        notes: Option<String>,
    ) -> PlannerResult<Self> {
        Ok(Self {
            name: validate_name(name, usize::MAX)?,
            window,
            budget_ceiling,
            activities,
            notes: normalize_notes(notes),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn window(&self) -> Option<&DateWindow> {
        self.window.as_ref()
    }

    pub fn budget_ceiling(&self) -> Option<Money> {
        self.budget_ceiling
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// The ceiling only constrains anything when it is set and positive
    fn effective_ceiling(&self) -> Option<Money> {
        self.budget_ceiling.filter(|c| c.is_positive())
    }

    fn check_ceiling(&self, current_total: Money, attempted: Money) -> PlannerResult<()> {
        if let Some(ceiling) = self.effective_ceiling() {
            let exceeds = current_total
                .checked_add(attempted)
                .map_or(true, |total| total > ceiling);
            if exceeds {
                return Err(PlannerError::BudgetExceeded {
                    ceiling,
                    current_total,
                    attempted,
                });
            }
        }
        Ok(())
    }

    /// Append an activity, rejecting it if it would push the total over the ceiling
    pub fn add_activity(&mut self, activity: Activity) -> PlannerResult<()> {
        self.check_ceiling(self.total_activity_budget(), activity.budget())?;
        self.activities.push(activity);
        Ok(())
    }

    /// Replace the activity at `index`; the ceiling is checked against the
    /// total without the activity being replaced.
    pub fn update_activity(&mut self, index: usize, activity: Activity) -> PlannerResult<()> {
        let existing = self.activities.get(index).ok_or(PlannerError::IndexOutOfRange {
            index,
            len: self.activities.len(),
        })?;
        let others = self.total_activity_budget() - existing.budget();
        self.check_ceiling(others, activity.budget())?;
        self.activities[index] = activity;
        Ok(())
    }

    /// Remove the activity at `index` and return the remaining activities
    pub fn remove_activity(&mut self, index: usize) -> PlannerResult<&[Activity]> {
        if index >= self.activities.len() {
            return Err(PlannerError::IndexOutOfRange {
                index,
                len: self.activities.len(),
            });
        }
        self.activities.remove(index);
        Ok(&self.activities)
    }

    pub fn total_activity_budget(&self) -> Money {
        self.activities.iter().map(Activity::budget).sum()
    }

    /// Money left under the ceiling; negative when the ceiling was lowered below the planned total
    pub fn remaining_budget(&self) -> Option<Money> {
        self.effective_ceiling()
            .map(|ceiling| ceiling - self.total_activity_budget())
    }

    /// Whether planned activities exceed the ceiling. Only possible after the
    /// ceiling itself was edited, since activity mutations are gated.
    pub fn is_over_ceiling(&self) -> bool {
        self.remaining_budget().map_or(false, |r| r.is_negative())
    }

    /// Amount this destination contributes to the trip budget
    pub fn planned_budget(&self) -> Money {
        self.effective_ceiling()
            .unwrap_or_else(|| self.total_activity_budget())
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Editing the window does not touch the activities
    pub fn set_window(&mut self, window: Option<DateWindow>) {
        self.window = window;
    }

    /// Changing the ceiling does not re-validate activities already planned
    pub fn set_budget_ceiling(&mut self, ceiling: Option<Money>) -> PlannerResult<()> {
        if let Some(c) = ceiling {
            if c.is_negative() {
                return Err(PlannerError::InvalidAmount(c.to_plain_string()));
            }
        }
        self.budget_ceiling = ceiling;
        Ok(())
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = normalize_notes(notes);
    }
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes.filter(|n| !n.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_activity(name: &str, dollars: i64) -> Activity {
        Activity::new(name, Money::from_dollars(dollars)).unwrap()
    }

    fn create_test_destination(ceiling: Option<i64>) -> Destination {
        let mut builder = Destination::builder("Paris");
        if let Some(c) = ceiling {
            builder = builder.budget_ceiling(Money::from_dollars(c));
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_budget_ceiling_scenario() {
        let mut paris = create_test_destination(Some(500));

        paris.add_activity(create_test_activity("Louvre", 300)).unwrap();
        assert_eq!(paris.total_activity_budget(), Money::from_dollars(300));

        let result = paris.add_activity(create_test_activity("Seine cruise", 250));
        assert_eq!(
            result,
            Err(PlannerError::BudgetExceeded {
                ceiling: Money::from_dollars(500),
                current_total: Money::from_dollars(300),
                attempted: Money::from_dollars(250),
            })
        );
        assert_eq!(paris.activities().len(), 1);
        assert_eq!(paris.total_activity_budget(), Money::from_dollars(300));
    }

    #[test]
    fn test_activity_reaching_ceiling_exactly_is_accepted() {
        let mut paris = create_test_destination(Some(500));
        paris.add_activity(create_test_activity("Louvre", 300)).unwrap();
        paris.add_activity(create_test_activity("Dinner", 200)).unwrap();
        assert_eq!(paris.remaining_budget(), Some(Money::ZERO));
    }

    #[test]
    fn test_total_never_exceeds_ceiling() {
        let mut paris = create_test_destination(Some(100));
        for dollars in [30, 50, 40, 20, 10, 5, 60] {
            let before = paris.activities().to_vec();
            match paris.add_activity(create_test_activity("Item", dollars)) {
                Ok(()) => assert_eq!(paris.activities().len(), before.len() + 1),
                Err(PlannerError::BudgetExceeded { .. }) => assert_eq!(paris.activities(), &before[..]),
                Err(other) => panic!("unexpected error {:?}", other),
            }
            assert!(paris.total_activity_budget() <= Money::from_dollars(100));
        }
        assert_eq!(paris.total_activity_budget(), Money::from_dollars(100));
    }

    #[test]
    fn test_no_ceiling_or_zero_ceiling_is_unbounded() {
        let mut open = create_test_destination(None);
        let mut zero = create_test_destination(Some(0));
        for _ in 0..3 {
            open.add_activity(create_test_activity("Splurge", 10_000)).unwrap();
            zero.add_activity(create_test_activity("Splurge", 10_000)).unwrap();
        }
        assert_eq!(open.total_activity_budget(), Money::from_dollars(30_000));
        assert_eq!(zero.remaining_budget(), None);
    }

    #[test]
    fn test_remove_activity() {
        let mut paris = create_test_destination(None);
        paris.add_activity(create_test_activity("A", 1)).unwrap();
        paris.add_activity(create_test_activity("B", 2)).unwrap();
        paris.add_activity(create_test_activity("C", 3)).unwrap();

        let remaining = paris.remove_activity(1).unwrap();
        let names: Vec<&str> = remaining.iter().map(Activity::name).collect();
        assert_eq!(names, vec!["A", "C"]);

        assert_eq!(
            paris.remove_activity(5),
            Err(PlannerError::IndexOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(paris.total_activity_budget(), Money::from_dollars(4));
    }

    #[test]
    fn test_update_activity_excludes_replaced_budget() {
        let mut paris = create_test_destination(Some(500));
        paris.add_activity(create_test_activity("Louvre", 300)).unwrap();
        paris.add_activity(create_test_activity("Dinner", 150)).unwrap();

        // 300 + 150 -> 300 + 200 fits
        paris.update_activity(1, create_test_activity("Fancy dinner", 200)).unwrap();
        assert_eq!(paris.activities()[1].name(), "Fancy dinner");

        let result = paris.update_activity(1, create_test_activity("Michelin dinner", 201));
        assert!(matches!(result, Err(PlannerError::BudgetExceeded { .. })));
        assert_eq!(paris.activities()[1].name(), "Fancy dinner");

        assert!(matches!(
            paris.update_activity(9, create_test_activity("X", 1)),
            Err(PlannerError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_lowering_ceiling_does_not_revalidate_existing_activities() {
        let mut paris = create_test_destination(Some(500));
        paris.add_activity(create_test_activity("Louvre", 300)).unwrap();

        paris.set_budget_ceiling(Some(Money::from_dollars(100))).unwrap();

        assert_eq!(paris.activities().len(), 1);
        assert!(paris.is_over_ceiling());
        assert_eq!(paris.remaining_budget(), Some(Money::from_dollars(-200)));

        // New additions are still gated by the lowered ceiling
        assert!(paris.add_activity(create_test_activity("Coffee", 1)).is_err());
    }

    #[test]
    fn test_builder_validation() {
        assert!(matches!(Destination::builder(" ").build(), Err(PlannerError::EmptyName)));
        assert!(matches!(
            Destination::builder("Rome").budget_ceiling(Money::from_cents(-1)).build(),
            Err(PlannerError::InvalidAmount(_))
        ));
        assert!(matches!(
            Destination::builder("Rome")
                .budget_ceiling(Money::from_dollars(10))
                .activity(create_test_activity("Colosseum", 25))
                .build(),
            Err(PlannerError::BudgetExceeded { .. })
        ));

        let rome = Destination::builder("Rome").notes("  ").build().unwrap();
        assert_eq!(rome.notes(), None);
    }

    #[test]
    fn test_planned_budget_prefers_ceiling() {
        let mut capped = create_test_destination(Some(500));
        capped.add_activity(create_test_activity("Louvre", 30)).unwrap();
        assert_eq!(capped.planned_budget(), Money::from_dollars(500));

        let mut uncapped = create_test_destination(None);
        uncapped.add_activity(create_test_activity("Louvre", 30)).unwrap();
        assert_eq!(uncapped.planned_budget(), Money::from_dollars(30));
    }

    #[test]
    fn test_ceiling_check_holds_near_i64_limit() {
        let mut vault = Destination::builder("Vault")
            .budget_ceiling(Money::from_cents(i64::MAX))
            .build()
            .unwrap();
        let biggest = Activity::new("Big ticket", Money::MAX).unwrap();

        let mut added = 0;
        let rejection = loop {
            match vault.add_activity(biggest.clone()) {
                Ok(()) => added += 1,
                Err(e) => break e,
            }
        };

        assert!(matches!(rejection, PlannerError::BudgetExceeded { .. }));
        assert_eq!(added, 9_223);
        assert!(vault.total_activity_budget().is_positive());
        assert!(!vault.is_over_ceiling());
    }

    #[test]
    fn test_builder_name_limit_is_configurable() {
        let long_name = "n".repeat(300);
        assert!(matches!(
            Destination::builder(&long_name).build(),
            Err(PlannerError::NameTooLong { len: 300, max: 256 })
        ));

        let built = Destination::builder(&long_name).max_name_length(400).build().unwrap();
        assert_eq!(built.name().len(), 300);

        let restored = Destination::restore(&long_name, None, None, Vec::new(), None).unwrap();
        assert_eq!(restored.name().len(), 300);
    }
}

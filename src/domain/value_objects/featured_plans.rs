use std::fmt::Display;

use chrono::Duration;
use serde::{Deserialize, Serialize};

pub const DAYS_PER_WEEK: i64 = 7;

/// Identifier of a purchasable promotion plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FeaturedPlanId {
    #[serde(rename = "1_week")]
    OneWeek,
    #[serde(rename = "3_weeks")]
    ThreeWeeks,
}

impl FeaturedPlanId {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeaturedPlanId::OneWeek => "1_week",
            FeaturedPlanId::ThreeWeeks => "3_weeks",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "1_week" => Some(FeaturedPlanId::OneWeek),
            "3_weeks" => Some(FeaturedPlanId::ThreeWeeks),
            _ => None,
        }
    }
}

impl Display for FeaturedPlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturedPlan {
    pub id: FeaturedPlanId,
    pub name: &'static str,
    pub weeks: i64,
    pub price_minor: i64,
    pub popular: bool,
}

static FEATURED_PLANS: [FeaturedPlan; 2] = [
    FeaturedPlan {
        id: FeaturedPlanId::OneWeek,
        name: "1 week",
        weeks: 1,
        price_minor: 2900,
        popular: false,
    },
    FeaturedPlan {
        id: FeaturedPlanId::ThreeWeeks,
        name: "3 weeks",
        weeks: 3,
        price_minor: 6900,
        popular: true,
    },
];

pub fn featured_plans() -> &'static [FeaturedPlan] {
    &FEATURED_PLANS
}

pub fn featured_plan(id: FeaturedPlanId) -> &'static FeaturedPlan {
    match id {
        FeaturedPlanId::OneWeek => &FEATURED_PLANS[0],
        FeaturedPlanId::ThreeWeeks => &FEATURED_PLANS[1],
    }
}

/// Looks up a plan by its wire id (`"1_week"`, `"3_weeks"`).
pub fn find_featured_plan(plan_id: &str) -> Option<&'static FeaturedPlan> {
    FeaturedPlanId::parse(plan_id).map(featured_plan)
}

impl FeaturedPlan {
    pub fn duration_days(&self) -> i64 {
        DAYS_PER_WEEK * self.weeks
    }

    pub fn duration(&self) -> Duration {
        Duration::days(self.duration_days())
    }

    /// `2900` with `usd` renders as `29.00 USD`.
    pub fn format_price(&self, currency: &str) -> String {
        format!(
            "{}.{:02} {}",
            self.price_minor / 100,
            self.price_minor % 100,
            currency.to_ascii_uppercase()
        )
    }

    pub fn format_duration(&self) -> String {
        if self.weeks == 1 {
            "1 week".to_string()
        } else {
            format!("{} weeks", self.weeks)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_durations_are_whole_weeks() {
        assert_eq!(featured_plan(FeaturedPlanId::OneWeek).duration_days(), 7);
        assert_eq!(featured_plan(FeaturedPlanId::ThreeWeeks).duration_days(), 21);
        assert_eq!(
            featured_plan(FeaturedPlanId::ThreeWeeks).duration(),
            Duration::days(21)
        );
    }

    #[test]
    fn lookup_by_wire_id() {
        assert_eq!(
            find_featured_plan("3_weeks").map(|plan| plan.id),
            Some(FeaturedPlanId::ThreeWeeks)
        );
        assert!(find_featured_plan("2_weeks").is_none());
        assert!(find_featured_plan("").is_none());
    }

    #[test]
    fn only_the_longer_plan_is_marked_popular() {
        let popular: Vec<_> = featured_plans()
            .iter()
            .filter(|plan| plan.popular)
            .map(|plan| plan.id)
            .collect();
        assert_eq!(popular, vec![FeaturedPlanId::ThreeWeeks]);
    }

    #[test]
    fn display_strings() {
        let one_week = featured_plan(FeaturedPlanId::OneWeek);
        assert_eq!(one_week.format_price("usd"), "29.00 USD");
        assert_eq!(one_week.format_duration(), "1 week");

        let three_weeks = featured_plan(FeaturedPlanId::ThreeWeeks);
        assert_eq!(three_weeks.format_price("eur"), "69.00 EUR");
        assert_eq!(three_weeks.format_duration(), "3 weeks");
    }
}

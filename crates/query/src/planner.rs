//! Filter planning: split a [`FilterSpec`] into what the store can evaluate
//! and what has to be re-checked after the page comes back.
//!
//! ## Rules (fixed priority)
//! 1. Quality: none → no constraint, one → equality, several → membership
//! 2. Each set boolean → equality
//! 3. Numeric ranges: only ONE range field per query. A revenue bound wins;
//!    subscriber bounds are pushed only when no revenue bound is set
//! 4. Search text and category tags are never pushed

use crate::spec::FilterSpec;
use catalog::{Constraint, Field};
use tracing::debug;

/// Pushable constraints plus which range went to the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanResult {
    pub constraints: Vec<Constraint>,
    pub revenue_range_pushed: bool,
    pub subscriber_range_pushed: bool,
}

impl PlanResult {
    /// Subscriber bounds the store did not apply and the residual pass must
    pub fn subscriber_range_is_residual(&self) -> bool {
        self.revenue_range_pushed
    }
}

/// Stateless planner; see the module docs for the rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterPlanner;

impl FilterPlanner {
    pub fn plan(filters: &FilterSpec) -> PlanResult {
        if filters.is_unconstrained() {
            return PlanResult::default();
        }

        let mut constraints = Vec::new();

        match filters.quality.as_slice() {
            [] => {}
            [only] => constraints.push(Constraint::equals(Field::Quality, only.as_str())),
            many => constraints.push(Constraint::one_of(
                Field::Quality,
                many.iter().map(|q| q.as_str().to_string()).collect(),
            )),
        }

        if let Some(v) = filters.is_monetized {
            constraints.push(Constraint::equals(Field::IsMonetized, v));
        }
        if let Some(v) = filters.is_faceless {
            constraints.push(Constraint::equals(Field::IsFaceless, v));
        }
        if let Some(v) = filters.has_shorts {
            constraints.push(Constraint::equals(Field::HasShorts, v));
        }

        let mut revenue_range_pushed = false;
        let mut subscriber_range_pushed = false;
        if filters.has_revenue_bound() {
            revenue_range_pushed = true;
            if let Some(min) = filters.min_revenue {
                constraints.push(Constraint::gte(Field::AvgMonthlyRevenue, min));
            }
            if let Some(max) = filters.max_revenue {
                constraints.push(Constraint::lte(Field::AvgMonthlyRevenue, max));
            }
        } else if filters.has_subscriber_bound() {
            subscriber_range_pushed = true;
            if let Some(min) = filters.min_subscribers {
                constraints.push(Constraint::gte(Field::Subscribers, min));
            }
            if let Some(max) = filters.max_subscribers {
                constraints.push(Constraint::lte(Field::Subscribers, max));
            }
        }

        debug!(
            "Planned {} pushable constraints (revenue range: {}, subscriber range: {})",
            constraints.len(),
            revenue_range_pushed,
            subscriber_range_pushed
        );

        PlanResult {
            constraints,
            revenue_range_pushed,
            subscriber_range_pushed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{validate_constraints, FieldValue, Operator, Quality};

    #[test]
    fn test_default_spec_plans_nothing() {
        let plan = FilterPlanner::plan(&FilterSpec::default());
        assert!(plan.constraints.is_empty());
        assert!(!plan.revenue_range_pushed);
        assert!(!plan.subscriber_range_pushed);
    }

    #[test]
    fn test_quality_equality_vs_membership() {
        let one = FilterSpec {
            quality: vec![Quality::High],
            ..Default::default()
        };
        let plan = FilterPlanner::plan(&one);
        assert_eq!(plan.constraints, vec![Constraint::equals(Field::Quality, "high")]);

        let two = FilterSpec {
            quality: vec![Quality::Mid, Quality::High],
            ..Default::default()
        };
        let plan = FilterPlanner::plan(&two);
        assert_eq!(plan.constraints.len(), 1);
        assert_eq!(plan.constraints[0].op, Operator::In);
        assert_eq!(
            plan.constraints[0].value,
            FieldValue::List(vec!["mid".to_string(), "high".to_string()])
        );
    }

    #[test]
    fn test_booleans_become_equalities() {
        let spec = FilterSpec {
            is_monetized: Some(true),
            is_faceless: Some(false),
            has_shorts: Some(true),
            ..Default::default()
        };
        let plan = FilterPlanner::plan(&spec);
        assert_eq!(
            plan.constraints,
            vec![
                Constraint::equals(Field::IsMonetized, true),
                Constraint::equals(Field::IsFaceless, false),
                Constraint::equals(Field::HasShorts, true),
            ]
        );
    }

    #[test]
    fn test_revenue_range_wins_over_subscribers() {
        let spec = FilterSpec {
            min_revenue: Some(1000.0),
            min_subscribers: Some(5000),
            ..Default::default()
        };
        let plan = FilterPlanner::plan(&spec);

        assert_eq!(
            plan.constraints,
            vec![Constraint::gte(Field::AvgMonthlyRevenue, 1000.0)]
        );
        assert!(plan.revenue_range_pushed);
        assert!(!plan.subscriber_range_pushed);
        assert!(plan.subscriber_range_is_residual());
    }

    #[test]
    fn test_max_revenue_alone_still_takes_priority() {
        let spec = FilterSpec {
            max_revenue: Some(50.0),
            min_subscribers: Some(10),
            max_subscribers: Some(100),
            ..Default::default()
        };
        let plan = FilterPlanner::plan(&spec);
        assert_eq!(
            plan.constraints,
            vec![Constraint::lte(Field::AvgMonthlyRevenue, 50.0)]
        );
        assert!(!plan.subscriber_range_pushed);
    }

    #[test]
    fn test_subscriber_range_pushed_without_revenue() {
        let spec = FilterSpec {
            min_subscribers: Some(1000),
            max_subscribers: Some(9000),
            ..Default::default()
        };
        let plan = FilterPlanner::plan(&spec);
        assert_eq!(
            plan.constraints,
            vec![
                Constraint::gte(Field::Subscribers, 1000u64),
                Constraint::lte(Field::Subscribers, 9000u64),
            ]
        );
        assert!(plan.subscriber_range_pushed);
        assert!(!plan.subscriber_range_is_residual());
    }

    #[test]
    fn test_search_and_categories_never_pushed() {
        let spec = FilterSpec {
            search: "gaming".to_string(),
            categories: vec!["Gaming".to_string()],
            ..Default::default()
        };
        assert!(FilterPlanner::plan(&spec).constraints.is_empty());
    }

    #[test]
    fn test_every_combination_has_at_most_one_range_field() {
        let bounds = [None, Some(10.0)];
        let sub_bounds = [None, Some(10u64)];
        for min_rev in bounds {
            for max_rev in bounds {
                for min_sub in sub_bounds {
                    for max_sub in sub_bounds {
                        let spec = FilterSpec {
                            min_revenue: min_rev,
                            max_revenue: max_rev,
                            min_subscribers: min_sub,
                            max_subscribers: max_sub,
                            quality: vec![Quality::Low, Quality::High],
                            is_monetized: Some(true),
                            ..Default::default()
                        };
                        let plan = FilterPlanner::plan(&spec);
                        assert!(validate_constraints(&plan.constraints).is_ok());
                        assert!(!(plan.revenue_range_pushed && plan.subscriber_range_pushed));
                        if spec.has_revenue_bound() {
                            assert!(!plan.subscriber_range_pushed);
                        }
                    }
                }
            }
        }
    }
}

//! Role gating for resolved commands.
//!
//! The policy is an ordered list of rules, each a predicate over command
//! identifiers plus a role requirement. The first matching rule decides;
//! commands no rule covers are allowed and checked deeper in their handler.

use crate::domain::Role;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    AtLeast(Role),
    Exactly(Role),
}

impl Requirement {
    fn satisfied_by(self, role: Role) -> bool {
        match self {
            Requirement::AtLeast(min) => role.is_at_least(min),
            Requirement::Exactly(wanted) => role == wanted,
        }
    }
}

/// Category membership: exact identifiers and/or identifier prefixes.
#[derive(Clone, Debug)]
struct Predicate {
    ids: &'static [&'static str],
    prefixes: &'static [&'static str],
}

impl Predicate {
    const fn ids(ids: &'static [&'static str]) -> Self {
        Self { ids, prefixes: &[] }
    }

    const fn prefixes(prefixes: &'static [&'static str]) -> Self {
        Self { ids: &[], prefixes }
    }

    fn matches(&self, identifier: &str) -> bool {
        self.ids.contains(&identifier)
            || self.prefixes.iter().any(|p| identifier.starts_with(p))
    }
}

#[derive(Clone, Debug)]
pub struct AccessRule {
    name: &'static str,
    predicate: Predicate,
    requirement: Requirement,
    /// Per-command exceptions inside the category.
    overrides: &'static [(&'static str, Requirement)],
}

impl AccessRule {
    fn requirement_for(&self, identifier: &str) -> Requirement {
        self.overrides
            .iter()
            .find(|(id, _)| *id == identifier)
            .map(|(_, req)| *req)
            .unwrap_or(self.requirement)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied,
}

#[derive(Clone, Debug)]
pub struct Policy {
    rules: Vec<AccessRule>,
}

impl Policy {
    /// The production policy table.
    pub fn standard() -> Self {
        use Requirement::*;
        use Role::*;

        let rules = vec![
            AccessRule {
                name: "staff-management",
                predicate: Predicate::prefixes(&["staff_"]),
                requirement: AtLeast(SeniorOperator),
                overrides: &[],
            },
            AccessRule {
                name: "stats-and-exports",
                predicate: Predicate::prefixes(&["stats_", "excel_generate_", "send_excel_"]),
                requirement: AtLeast(SeniorOperator),
                overrides: &[],
            },
            AccessRule {
                name: "user-blocking",
                predicate: Predicate::prefixes(&["block_user_", "unblock_user_"]),
                requirement: AtLeast(Operator),
                overrides: &[],
            },
            AccessRule {
                name: "salary",
                predicate: Predicate::prefixes(&["my_salary"]),
                requirement: AtLeast(Loader),
                overrides: &[],
            },
            AccessRule {
                name: "driver-settlement",
                predicate: Predicate::prefixes(&["settle_"]),
                requirement: Exactly(Driver),
                overrides: &[],
            },
            AccessRule {
                name: "owner-payouts",
                predicate: Predicate::prefixes(&["owner_staff_payout"]),
                requirement: AtLeast(Owner),
                overrides: &[],
            },
            AccessRule {
                name: "owner-financials",
                predicate: Predicate::prefixes(&["owner_financials"]),
                requirement: AtLeast(SeniorOperator),
                overrides: &[],
            },
            AccessRule {
                // The per-driver settlement view sits in this category but
                // is open to operators, unlike its owner-only siblings.
                name: "owner-cash",
                predicate: Predicate {
                    ids: &["operator_view_settlement"],
                    prefixes: &["owner_cash_", "owner_mark_all_"],
                },
                requirement: AtLeast(Owner),
                overrides: &[("operator_view_settlement", AtLeast(Operator))],
            },
            AccessRule {
                name: "settlement-review",
                predicate: Predicate::ids(&["settlement_approve", "settlement_reject"]),
                requirement: AtLeast(Operator),
                overrides: &[],
            },
        ];

        Self { rules }
    }

    pub fn check(&self, identifier: &str, role: Role) -> Decision {
        for rule in &self.rules {
            if !rule.predicate.matches(identifier) {
                continue;
            }
            let requirement = rule.requirement_for(identifier);
            if requirement.satisfied_by(role) {
                return Decision::Allowed;
            }
            tracing::debug!(
                rule = rule.name,
                identifier,
                ?role,
                "access denied by policy"
            );
            return Decision::Denied;
        }
        Decision::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowest_tier_cannot_open_staff_menu() {
        let policy = Policy::standard();
        assert_eq!(policy.check("staff_menu", Role::User), Decision::Denied);
        assert_eq!(
            policy.check("staff_menu", Role::SeniorOperator),
            Decision::Allowed
        );
    }

    #[test]
    fn operator_is_not_enough_for_stats() {
        let policy = Policy::standard();
        assert_eq!(
            policy.check("stats_select_day", Role::Operator),
            Decision::Denied
        );
        assert_eq!(policy.check("stats_select_day", Role::Owner), Decision::Allowed);
    }

    #[test]
    fn settlement_flow_is_driver_only() {
        let policy = Policy::standard();
        assert_eq!(policy.check("settle_set_fuel", Role::Driver), Decision::Allowed);
        // Loaders share the tier but not the flow.
        assert_eq!(policy.check("settle_set_fuel", Role::Loader), Decision::Denied);
        assert_eq!(policy.check("settle_set_fuel", Role::Owner), Decision::Denied);
    }

    #[test]
    fn salary_admits_every_staff_tier() {
        let policy = Policy::standard();
        assert_eq!(policy.check("my_salary", Role::Loader), Decision::Allowed);
        assert_eq!(policy.check("my_salary", Role::Driver), Decision::Allowed);
        assert_eq!(policy.check("my_salary", Role::User), Decision::Denied);
    }

    #[test]
    fn owner_cash_is_owner_only_but_review_is_not() {
        let policy = Policy::standard();
        assert_eq!(
            policy.check("owner_cash_mark_salary_paid", Role::SeniorOperator),
            Decision::Denied
        );
        assert_eq!(
            policy.check("owner_cash_mark_salary_paid", Role::Owner),
            Decision::Allowed
        );
        assert_eq!(
            policy.check("operator_view_settlement", Role::Operator),
            Decision::Allowed
        );
        assert_eq!(
            policy.check("settlement_approve", Role::Operator),
            Decision::Allowed
        );
    }

    #[test]
    fn uncovered_commands_default_to_allowed() {
        let policy = Policy::standard();
        assert_eq!(policy.check("category_waste", Role::User), Decision::Allowed);
        assert_eq!(policy.check("noop", Role::User), Decision::Allowed);
    }
}

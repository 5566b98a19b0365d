use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::pattern::pattern_matches;
use crate::Result;
use crate::database::models::EventModifierDbModel;
use crate::database::repositories::EventModifierRepository;

/// Why a rule refused an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AclCause {
    Blacklisted,
    NotWhitelisted,
}

/// A denial, citing the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclFailure {
    pub modifier_id: String,
    pub cause: AclCause,
}

impl fmt::Display for AclFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cause {
            AclCause::Blacklisted => write!(
                f,
                "event_modifier {}: blacklisted event modifier and event matches modifier",
                self.modifier_id
            ),
            AclCause::NotWhitelisted => write!(
                f,
                "event_modifier {}: whitelist-only event modifier but event not matched",
                self.modifier_id
            ),
        }
    }
}

/// Outcome of evaluating the rule set for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventCheck {
    Denied(AclFailure),
    Allowed {
        channel_override: Option<String>,
        /// A matching redirect rule has claimed the event.
        overridden: bool,
    },
}

impl EventCheck {
    pub fn is_allowed(&self) -> bool {
        matches!(self, EventCheck::Allowed { .. })
    }

    /// Channels to deliver to: the override if one survived, else `bound`.
    pub fn channels(&self, bound: Vec<String>) -> Vec<String> {
        match self {
            EventCheck::Allowed {
                channel_override: Some(channel),
                ..
            } => vec![channel.clone()],
            _ => bound,
        }
    }
}

/// Evaluate `rules` against `event`.
///
/// Rules scoped to a repository other than `repo_id` are ignored. The rest
/// are walked by priority descending; rules of equal priority keep their
/// input order.
pub fn evaluate(rules: &[EventModifierDbModel], repo_id: Option<&str>, event: &str) -> EventCheck {
    let mut applicable: Vec<&EventModifierDbModel> = rules
        .iter()
        .filter(|rule| match (repo_id, rule.repo_id.as_deref()) {
            (Some(repo), Some(scope)) if !scope.is_empty() => scope == repo,
            _ => true,
        })
        .collect();
    applicable.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut channel_override: Option<String> = None;
    let mut overridden = false;

    for rule in applicable {
        let matched = rule
            .get_events()
            .iter()
            .any(|pattern| pattern_matches(pattern, event));

        if !matched {
            if rule.whitelisted {
                if overridden {
                    // A higher-priority redirect already claimed the event.
                    return EventCheck::Allowed {
                        channel_override,
                        overridden,
                    };
                }
                return EventCheck::Denied(AclFailure {
                    modifier_id: rule.id.clone(),
                    cause: AclCause::NotWhitelisted,
                });
            }
            continue;
        }

        if rule.blacklisted {
            return EventCheck::Denied(AclFailure {
                modifier_id: rule.id.clone(),
                cause: AclCause::Blacklisted,
            });
        }

        if let Some(channel) = rule.redirect_channel.as_deref().filter(|c| !c.is_empty()) {
            channel_override = Some(channel.to_string());
            overridden = true;
        }
    }

    EventCheck::Allowed {
        channel_override,
        overridden,
    }
}

/// Loads a destination's rules and evaluates them. Nothing is cached, so
/// rule edits apply to the next event.
#[derive(Clone)]
pub struct ModifierResolver {
    repo: Arc<dyn EventModifierRepository>,
}

impl ModifierResolver {
    pub fn new(repo: Arc<dyn EventModifierRepository>) -> Self {
        Self { repo }
    }

    pub async fn resolve(
        &self,
        destination_id: &str,
        repo_id: &str,
        event: &str,
    ) -> Result<EventCheck> {
        let rules = self.repo.list_modifiers(destination_id).await?;
        let check = evaluate(&rules, Some(repo_id), event);
        debug!(
            destination_id,
            repo_id,
            event,
            rules = rules.len(),
            ?check,
            "Evaluated event modifiers"
        );
        Ok(check)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, priority: i64, events: &[&str]) -> EventModifierDbModel {
        EventModifierDbModel::new(
            "d1",
            events.iter().map(|e| e.to_string()).collect(),
            priority,
        )
        .with_id(id)
    }

    fn allowed(channel: Option<&str>) -> EventCheck {
        EventCheck::Allowed {
            channel_override: channel.map(str::to_string),
            overridden: channel.is_some(),
        }
    }

    fn denied(id: &str, cause: AclCause) -> EventCheck {
        EventCheck::Denied(AclFailure {
            modifier_id: id.to_string(),
            cause,
        })
    }

    #[test]
    fn test_empty_rule_set_permits() {
        assert_eq!(evaluate(&[], Some("r1"), "push"), allowed(None));
    }

    #[test]
    fn test_whitelist_miss_denies() {
        let rules = vec![rule("w", 20, &["push"]).whitelist()];
        assert_eq!(
            evaluate(&rules, Some("r1"), "issues"),
            denied("w", AclCause::NotWhitelisted)
        );
        assert_eq!(evaluate(&rules, Some("r1"), "push"), allowed(None));
    }

    #[test]
    fn test_blacklist_wins_over_lower_whitelist_redirect() {
        let rules = vec![
            rule("b", 10, &["issues.*"]).whitelist().redirect("general"),
            rule("a", 20, &["issues.deleted"]).blacklist(),
        ];
        assert_eq!(
            evaluate(&rules, Some("r1"), "issues.deleted"),
            denied("a", AclCause::Blacklisted)
        );
        assert_eq!(evaluate(&rules, Some("r1"), "issues.opened"), allowed(Some("general")));
    }

    #[test]
    fn test_blacklist_below_redirect_still_denies() {
        let rules = vec![
            rule("redir", 50, &["push"]).redirect("elsewhere"),
            rule("block", 1, &["*"]).blacklist(),
        ];
        assert_eq!(
            evaluate(&rules, Some("r1"), "push"),
            denied("block", AclCause::Blacklisted)
        );
    }

    #[test]
    fn test_lowest_priority_matching_redirect_wins() {
        let rules = vec![
            rule("r1", 10, &["push"]).redirect("ten"),
            rule("r2", 5, &["push"]).redirect("five"),
        ];
        assert_eq!(evaluate(&rules, Some("repo"), "push"), allowed(Some("five")));

        // Input order must not matter.
        let reversed: Vec<_> = rules.into_iter().rev().collect();
        assert_eq!(evaluate(&reversed, Some("repo"), "push"), allowed(Some("five")));
    }

    #[test]
    fn test_redirect_suppresses_later_whitelist_miss() {
        let rules = vec![
            rule("redir", 30, &["issues.*"]).redirect("triage"),
            rule("wl", 10, &["push"]).whitelist(),
            rule("late", 1, &["issues.*"]).redirect("never"),
        ];
        // The whitelist miss short-circuits with the redirect intact, so the
        // lower-priority redirect is never reached.
        assert_eq!(evaluate(&rules, Some("r"), "issues.opened"), allowed(Some("triage")));
    }

    #[test]
    fn test_non_matching_plain_rule_is_skipped() {
        let rules = vec![rule("x", 10, &["release"]).redirect("rel")];
        assert_eq!(evaluate(&rules, Some("r"), "push"), allowed(None));
    }

    #[test]
    fn test_repo_scoped_rules() {
        let rules = vec![
            rule("other", 10, &["push"]).for_repo("r2").blacklist(),
            rule("mine", 5, &["push"]).for_repo("r1").redirect("mine-chan"),
        ];
        assert_eq!(evaluate(&rules, Some("r1"), "push"), allowed(Some("mine-chan")));
        assert_eq!(
            evaluate(&rules, Some("r2"), "push"),
            denied("other", AclCause::Blacklisted)
        );
        // No repo id: every rule applies.
        assert_eq!(
            evaluate(&rules, None, "push"),
            denied("other", AclCause::Blacklisted)
        );
    }

    #[test]
    fn test_equal_priority_is_stable() {
        let rules = vec![
            rule("first", 5, &["push"]).redirect("a"),
            rule("second", 5, &["push"]).redirect("b"),
        ];
        assert_eq!(evaluate(&rules, Some("r"), "push"), allowed(Some("b")));
    }

    #[test]
    fn test_empty_redirect_is_ignored() {
        let rules = vec![rule("x", 1, &["push"]).redirect("")];
        assert_eq!(evaluate(&rules, Some("r"), "push"), allowed(None));
    }

    #[test]
    fn test_acl_failure_message() {
        let failure = AclFailure {
            modifier_id: "m1".to_string(),
            cause: AclCause::NotWhitelisted,
        };
        assert_eq!(
            failure.to_string(),
            "event_modifier m1: whitelist-only event modifier but event not matched"
        );
    }

    #[test]
    fn test_channels() {
        let bound = vec!["1".to_string(), "2".to_string()];
        assert_eq!(allowed(None).channels(bound.clone()), bound);
        assert_eq!(allowed(Some("9")).channels(bound), vec!["9"]);
    }
}

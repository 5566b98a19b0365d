//! Access and protection events: `team`, `branch_protection_rule` and
//! `dependabot_alert`.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::parse;
use crate::error::RenderError;
use crate::message::{
    COLOR_DARK_RED, COLOR_GREEN, COLOR_RED, COLOR_YELLOW, MessageField, NotificationMessage,
};
use crate::payload::{Repository, User, excerpt};

/// Settings text beyond this is replaced by an ellipsis line.
const SETTINGS_MAX_LEN: usize = 2500;

/// `value` cut to `max` characters, or `default` when blank.
fn or_default(value: Option<&str>, max: usize, default: &str) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => excerpt(Some(v), max),
        None => default.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct Team {
    name: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    permission: Option<String>,
    #[serde(default)]
    privacy: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TeamEvent {
    action: String,
    team: Team,
    #[serde(default)]
    repository: Option<Repository>,
    sender: User,
}

pub(crate) fn team(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: TeamEvent = parse("team", body)?;
    let team = gh.team;

    let color = match gh.action.as_str() {
        "deleted" | "removed_from_repository" => COLOR_RED,
        _ => COLOR_GREEN,
    };
    let label = match team.slug.as_deref().filter(|s| !s.is_empty()) {
        Some(slug) => format!("{} | {slug}", team.name),
        None => team.name.clone(),
    };

    let mut msg = NotificationMessage::new(format!(
        "Team {} {}",
        team.name,
        gh.action.replace('_', " ")
    ))
    .color(color)
    .author(gh.sender.author())
    .description(or_default(team.description.as_deref(), 1000, "No description provided."))
    .field(MessageField::new(
        "Team",
        format!("[{label}]({})", team.html_url),
    ))
    .field(MessageField::new("User", gh.sender.link()))
    .field(MessageField::new(
        "Permission",
        or_default(team.permission.as_deref(), 1000, "No permissions provided."),
    ))
    .field(MessageField::new(
        "Privacy",
        or_default(team.privacy.as_deref(), 1000, "No privacy settings set."),
    ));

    if let Some(repo) = gh.repository {
        msg = msg.url(repo.html_url);
    }
    Ok(msg)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProtectionRule {
    name: String,
    admin_enforced: bool,
    require_code_owner_review: bool,
    allow_deletions_enforcement_level: String,
    allow_force_pushes_enforcement_level: String,
    authorized_actor_names: Vec<String>,
    authorized_actors_only: bool,
    authorized_dismissal_actors_only: bool,
    create_protected: bool,
    dismiss_stale_reviews_on_push: bool,
    ignore_approvals_from_contributors: bool,
    linear_history_requirement_enforcement_level: String,
    merge_queue_enforcement_level: String,
    pull_request_reviews_enforcement_level: String,
    required_approving_review_count: u64,
    required_conversation_resolution_level: String,
    required_deployments_enforcement_level: String,
    required_status_checks: Vec<String>,
    signature_requirement_enforcement_level: String,
    strict_required_status_checks_policy: bool,
}

impl ProtectionRule {
    /// One `**Name** => value` line per setting.
    fn settings(&self) -> String {
        let settings: [(&str, String); 19] = [
            ("Admin enforced", self.admin_enforced.to_string()),
            ("Require code owner review", self.require_code_owner_review.to_string()),
            ("Allow deletions", self.allow_deletions_enforcement_level.clone()),
            ("Allow force pushes", self.allow_force_pushes_enforcement_level.clone()),
            ("Authorized actors", self.authorized_actor_names.join(", ")),
            ("Authorized actors only", self.authorized_actors_only.to_string()),
            (
                "Authorized dismissal actors only",
                self.authorized_dismissal_actors_only.to_string(),
            ),
            ("Create protected", self.create_protected.to_string()),
            (
                "Dismiss stale reviews on push",
                self.dismiss_stale_reviews_on_push.to_string(),
            ),
            (
                "Ignore approvals from contributors",
                self.ignore_approvals_from_contributors.to_string(),
            ),
            (
                "Linear history requirement",
                self.linear_history_requirement_enforcement_level.clone(),
            ),
            ("Merge queue requirement", self.merge_queue_enforcement_level.clone()),
            (
                "Pull request reviews requirement",
                self.pull_request_reviews_enforcement_level.clone(),
            ),
            (
                "Required approving review count",
                self.required_approving_review_count.to_string(),
            ),
            (
                "Required conversation resolution",
                self.required_conversation_resolution_level.clone(),
            ),
            (
                "Required deployments",
                self.required_deployments_enforcement_level.clone(),
            ),
            ("Required status checks", self.required_status_checks.join(", ")),
            (
                "Signature requirement",
                self.signature_requirement_enforcement_level.clone(),
            ),
            (
                "Strict status checks",
                self.strict_required_status_checks_policy.to_string(),
            ),
        ];

        let mut out = String::new();
        for (name, value) in settings {
            if out.len() > SETTINGS_MAX_LEN {
                out.push_str("\n...");
                break;
            }
            out.push_str(&format!("**{name}** => {value}\n"));
        }
        out
    }
}

#[derive(Debug, Deserialize)]
struct BranchProtectionRuleEvent {
    action: String,
    #[serde(default)]
    rule: ProtectionRule,
    #[serde(default)]
    changes: Map<String, Value>,
    repository: Repository,
    sender: User,
}

pub(crate) fn branch_protection_rule(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: BranchProtectionRuleEvent = parse("branch_protection_rule", body)?;
    let repo = &gh.repository.full_name;

    let (title, color) = match gh.action.as_str() {
        "created" => (format!("New branch protection rule: {repo}"), COLOR_GREEN),
        "edited" => (format!("Branch protection rule edited: {repo}"), COLOR_YELLOW),
        _ => (format!("Branch protection rule deleted: {repo}"), COLOR_RED),
    };

    let mut description = format!("**Settings:**\n\n{}", gh.rule.settings());
    if !gh.changes.is_empty() {
        let changed: Vec<&str> = gh.changes.keys().map(String::as_str).collect();
        description.push_str(&format!("\n\n**Changes:**\n\n{}", changed.join(", ")));
    }

    let mut msg = NotificationMessage::new(title)
        .color(color)
        .url(gh.repository.html_url.clone())
        .author(gh.sender.author())
        .description(description)
        .field(MessageField::new("User", gh.sender.link()));

    if !gh.rule.name.is_empty() {
        msg = msg.field(MessageField::inline("Branch", gh.rule.name));
    }
    Ok(msg)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AlertPackage {
    name: String,
    ecosystem: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AlertDependency {
    package: AlertPackage,
    manifest_path: Option<String>,
    scope: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PatchedVersion {
    identifier: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Vulnerability {
    severity: String,
    vulnerable_version_range: String,
    first_patched_version: Option<PatchedVersion>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Advisory {
    severity: Option<String>,
    ghsa_id: Option<String>,
    cve_id: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    vulnerabilities: Vec<Vulnerability>,
}

#[derive(Debug, Deserialize)]
struct Alert {
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    dependency: AlertDependency,
    #[serde(default)]
    security_advisory: Advisory,
    #[serde(default)]
    dismissed_reason: Option<String>,
    #[serde(default)]
    dismissed_by: Option<User>,
}

#[derive(Debug, Deserialize)]
struct DependabotAlertEvent {
    action: String,
    alert: Alert,
    repository: Repository,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub(crate) fn dependabot_alert(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: DependabotAlertEvent = parse("dependabot_alert", body)?;
    let alert = gh.alert;
    let dependency = &alert.dependency;
    let advisory = &alert.security_advisory;

    let mut color = if gh.action == "closed" {
        COLOR_RED
    } else {
        COLOR_GREEN
    };

    let mut details = format!(
        "{} ({})",
        dependency.package.name, dependency.package.ecosystem
    );
    if let Some(scope) = non_empty(&dependency.scope) {
        details.push_str(&format!("\n**Scope:** {scope}"));
        if scope == "runtime" {
            details.push_str(" (runtime dependency, may be critical)");
        }
    }
    if let Some(path) = non_empty(&dependency.manifest_path) {
        details.push_str(&format!("\n**Manifest Path:** {path}"));
    }
    if let Some(severity) = non_empty(&advisory.severity) {
        details.push_str(&format!("\n**Severity:** {severity}"));
        if matches!(severity, "high" | "critical") {
            color = COLOR_DARK_RED;
        }
    }
    if let Some(ghsa) = non_empty(&advisory.ghsa_id) {
        details.push_str(&format!("\n**GHSA ID:** {ghsa}"));
    }
    if let Some(cve) = non_empty(&advisory.cve_id) {
        details.push_str(&format!("\n**CVE:** {cve}"));
    }
    if alert.state == "fixed" {
        details.push_str(&format!(
            "\n**Could be fixed by resolving:** {} {}",
            dependency.package.name,
            advisory.ghsa_id.as_deref().unwrap_or_default()
        ));
    }

    let mut summary = String::new();
    if let Some(text) = non_empty(&advisory.summary) {
        summary.push_str(&format!("**Summary:** {text}"));
    }
    if let Some(text) = non_empty(&advisory.description) {
        summary.push_str(&format!("\n\n{}", excerpt(Some(text), 996)));
    }

    let vulnerabilities: String = advisory
        .vulnerabilities
        .iter()
        .map(|v| {
            format!(
                "**Severity:** {}\n**Vulnerable Version Range:** {}\n**First Patched Version:** {}\n",
                v.severity,
                v.vulnerable_version_range,
                v.first_patched_version
                    .as_ref()
                    .map_or("-", |p| p.identifier.as_str())
            )
        })
        .collect();

    let mut dismissal = String::new();
    if let Some(reason) = non_empty(&alert.dismissed_reason) {
        dismissal.push_str(&format!("**Dismissed Reason:** {reason}"));
    }
    if let Some(by) = alert.dismissed_by.as_ref().filter(|u| !u.login.is_empty()) {
        dismissal.push_str(&format!("\n**Dismissed By:** {}", by.link()));
    }
    if dismissal.is_empty() {
        dismissal.push_str("Not dismissed");
    }

    Ok(NotificationMessage::new(format!(
        "Dependabot Alert on {} {}",
        gh.repository.full_name, alert.state
    ))
    .color(color)
    .url(alert.html_url.clone())
    .field(MessageField::inline(
        "URL",
        format!("[Click here]({})", alert.html_url),
    ))
    .field(MessageField::inline("State", alert.state.clone()))
    .field(MessageField::inline(
        "Details",
        excerpt(Some(details.as_str()), 1020),
    ))
    .field(MessageField::inline(
        "Summary",
        or_default(Some(summary.as_str()), 1020, "No summary available"),
    ))
    .field(MessageField::inline(
        "Vulnerabilities",
        or_default(Some(vulnerabilities.as_str()), 1020, "No vulnerabilities listed"),
    ))
    .field(MessageField::inline("Dismissal Details", dismissal.trim().to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_team_removed_from_repository() {
        let body = json!({
            "action": "removed_from_repository",
            "team": {"name": "core", "slug": "core-team", "html_url": "https://github.com/orgs/octo/teams/core"},
            "repository": {"full_name": "octo/repo", "html_url": "https://github.com/octo/repo"},
            "sender": {"login": "admin"}
        })
        .to_string();
        let msg = team(body.as_bytes()).unwrap();
        assert_eq!(msg.title, "Team core removed from repository");
        assert_eq!(msg.color, Some(COLOR_RED));
        assert_eq!(msg.description.as_deref(), Some("No description provided."));
        assert_eq!(
            msg.fields[0].value,
            "[core | core-team](https://github.com/orgs/octo/teams/core)"
        );
        assert_eq!(msg.fields[3].value, "No privacy settings set.");
        assert_eq!(msg.url.as_deref(), Some("https://github.com/octo/repo"));
    }

    #[test]
    fn test_branch_protection_rule_edited() {
        let body = json!({
            "action": "edited",
            "rule": {
                "name": "main", "admin_enforced": true,
                "required_approving_review_count": 2,
                "required_status_checks": ["ci/build", "ci/test"]
            },
            "changes": {"admin_enforced": {"from": false}},
            "repository": {"full_name": "octo/repo"},
            "sender": {"login": "admin"}
        })
        .to_string();
        let msg = branch_protection_rule(body.as_bytes()).unwrap();
        assert_eq!(msg.title, "Branch protection rule edited: octo/repo");
        assert_eq!(msg.color, Some(COLOR_YELLOW));

        let description = msg.description.unwrap();
        assert!(description.starts_with("**Settings:**\n\n**Admin enforced** => true\n"));
        assert!(description.contains("**Required approving review count** => 2"));
        assert!(description.contains("**Required status checks** => ci/build, ci/test"));
        assert!(description.ends_with("**Changes:**\n\nadmin_enforced"));
        assert_eq!(msg.fields[1].value, "main");
    }

    #[test]
    fn test_dependabot_alert_critical() {
        let body = json!({
            "action": "created",
            "alert": {
                "html_url": "https://github.com/octo/repo/security/dependabot/1",
                "state": "open",
                "dependency": {
                    "package": {"name": "lodash", "ecosystem": "npm"},
                    "manifest_path": "package.json", "scope": "runtime"
                },
                "security_advisory": {
                    "severity": "critical", "ghsa_id": "GHSA-xxxx", "cve_id": "CVE-2024-1",
                    "summary": "Prototype pollution",
                    "vulnerabilities": [{
                        "severity": "critical",
                        "vulnerable_version_range": "< 4.17.21",
                        "first_patched_version": {"identifier": "4.17.21"}
                    }]
                }
            },
            "repository": {"full_name": "octo/repo"},
            "sender": {"login": "dependabot[bot]"}
        })
        .to_string();
        let msg = dependabot_alert(body.as_bytes()).unwrap();
        assert_eq!(msg.title, "Dependabot Alert on octo/repo open");
        assert_eq!(msg.color, Some(COLOR_DARK_RED));
        assert!(msg.fields[2].value.starts_with("lodash (npm)\n**Scope:** runtime"));
        assert!(msg.fields[2].value.contains("**CVE:** CVE-2024-1"));
        assert_eq!(msg.fields[3].value, "**Summary:** Prototype pollution");
        assert!(msg.fields[4].value.contains("**First Patched Version:** 4.17.21"));
        assert_eq!(msg.fields[5].value, "Not dismissed");
    }

    #[test]
    fn test_dependabot_alert_dismissed() {
        let body = json!({
            "action": "dismissed",
            "alert": {
                "state": "dismissed",
                "dependency": {"package": {"name": "serde", "ecosystem": "cargo"}},
                "dismissed_reason": "tolerable_risk",
                "dismissed_by": {"login": "octocat", "html_url": "https://github.com/octocat"}
            },
            "repository": {"full_name": "octo/repo"}
        })
        .to_string();
        let msg = dependabot_alert(body.as_bytes()).unwrap();
        assert_eq!(msg.color, Some(COLOR_GREEN));
        assert_eq!(
            msg.fields[5].value,
            "**Dismissed Reason:** tolerable_risk\n**Dismissed By:** [octocat](https://github.com/octocat)"
        );
        assert_eq!(msg.fields[3].value, "No summary available");
        assert_eq!(msg.fields[4].value, "No vulnerabilities listed");
    }
}

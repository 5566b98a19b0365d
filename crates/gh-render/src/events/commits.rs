//! `push` and `commit_comment`.

use serde::Deserialize;

use super::{parse, short_sha};
use crate::error::RenderError;
use crate::message::{COLOR_GREEN, COLOR_RED, MessageField, NotificationMessage};
use crate::payload::{Comment, Repository, User, excerpt};

const COMMIT_MESSAGE_LIMIT: usize = 100;
const COMMIT_LIST_LIMIT: usize = 1000;

#[derive(Debug, Default, Deserialize)]
struct CommitAuthor {
    #[serde(default)]
    name: String,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Commit {
    id: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    author: CommitAuthor,
}

#[derive(Debug, Default, Deserialize)]
struct Pusher {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct PushEvent {
    #[serde(rename = "ref")]
    git_ref: String,
    #[serde(default)]
    base_ref: Option<String>,
    #[serde(default)]
    forced: bool,
    #[serde(default)]
    commits: Vec<Commit>,
    repository: Repository,
    sender: User,
    #[serde(default)]
    pusher: Pusher,
}

pub(crate) fn push(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: PushEvent = parse("push", body)?;

    let mut commit_list = String::new();
    for commit in &gh.commits {
        let author = commit
            .author
            .username
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(&commit.author.name);
        let first_line = commit.message.lines().next().unwrap_or_default();
        let line = format!(
            "{} [``{}``]({}) | [{}](https://github.com/{})\n",
            excerpt(Some(first_line), COMMIT_MESSAGE_LIMIT),
            short_sha(&commit.id),
            commit.url,
            author,
            author.replace(' ', "%20"),
        );
        if commit_list.chars().count() + line.chars().count() > COMMIT_LIST_LIMIT {
            commit_list.push_str("...");
            break;
        }
        commit_list.push_str(&line);
    }
    if commit_list.is_empty() {
        commit_list = "No commits?".to_string();
    }

    let mut branch = format!("**Ref:** {}", gh.git_ref);
    if let Some(base_ref) = gh.base_ref.as_deref().filter(|b| !b.is_empty()) {
        branch.push_str(&format!("\n**Base Ref:** {base_ref}"));
    }

    let (title, color) = if gh.forced {
        (format!("Force push on {}", gh.repository.full_name), COLOR_RED)
    } else {
        (format!("Push on {}", gh.repository.full_name), COLOR_GREEN)
    };

    Ok(NotificationMessage::new(title)
        .color(color)
        .url(gh.repository.html_url.clone())
        .author(gh.sender.author())
        .field(MessageField::new("Branch", branch))
        .field(MessageField::new("Commits", commit_list))
        .field(MessageField::inline("Commit Sender", gh.sender.link()))
        .field(MessageField::inline(
            "Pusher",
            format!("[{0}](https://github.com/{0})", gh.pusher.name),
        )))
}

#[derive(Debug, Deserialize)]
struct CommitCommentEvent {
    #[serde(default)]
    action: String,
    comment: Comment,
    repository: Repository,
    sender: User,
}

pub(crate) fn commit_comment(body: &[u8]) -> Result<NotificationMessage, RenderError> {
    let gh: CommitCommentEvent = parse("commit_comment", body)?;

    let commit = gh
        .comment
        .commit_id
        .as_deref()
        .map(short_sha)
        .unwrap_or("unknown");

    let mut msg = NotificationMessage::new(format!(
        "Comment on commit {} of {}",
        commit, gh.repository.full_name
    ))
    .color(COLOR_GREEN)
    .url(gh.comment.html_url.clone())
    .author(gh.sender.author())
    .description(excerpt(gh.comment.body.as_deref(), 996))
    .field(gh.sender.field());

    if !gh.action.is_empty() {
        msg = msg.field(MessageField::inline("Action", gh.action));
    }
    if let Some(path) = gh.comment.path.filter(|p| !p.is_empty()) {
        msg = msg.field(MessageField::inline("Path", path));
    }
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn push_body(commits: serde_json::Value) -> Vec<u8> {
        json!({
            "ref": "refs/heads/main",
            "base_ref": null,
            "commits": commits,
            "repository": {"full_name": "octo/repo", "html_url": "https://github.com/octo/repo"},
            "sender": {"login": "octocat", "avatar_url": "https://avatars/1", "html_url": "https://github.com/octocat"},
            "pusher": {"name": "octocat"}
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_push_lists_commits() {
        let body = push_body(json!([
            {"id": "0123456789abcdef", "message": "Fix bug\n\nlong body", "url": "https://c/1",
             "author": {"name": "Octo Cat", "username": "octocat"}}
        ]));
        let msg = push(&body).unwrap();

        assert_eq!(msg.title, "Push on octo/repo");
        assert_eq!(msg.color, Some(COLOR_GREEN));
        let commits = &msg.fields[1];
        assert_eq!(commits.name, "Commits");
        assert!(commits.value.contains("Fix bug [``0123456``](https://c/1)"));
        assert!(!commits.value.contains("long body"));
    }

    #[test]
    fn test_push_without_commits() {
        let msg = push(&push_body(json!([]))).unwrap();
        assert_eq!(msg.fields[1].value, "No commits?");
        assert_eq!(msg.fields[0].value, "**Ref:** refs/heads/main");
    }

    #[test]
    fn test_push_missing_ref_is_invalid() {
        let err = push(br#"{"repository": {"full_name": "a/b"}, "sender": {"login": "x"}}"#)
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidPayload { .. }));
    }
}

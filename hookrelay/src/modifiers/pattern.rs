/// Test an event pattern against an event kind such as `issues.opened`.
///
/// Both sides are split on `.`. Literal segments compare exactly and
/// case-sensitively. A `*` segment matches exactly one segment, except in
/// last position where it matches every remaining segment, including none:
/// `issues.*` matches `issues`, `issues.opened` and `issues.opened.x`, and
/// a lone `*` matches everything.
pub fn pattern_matches(pattern: &str, event: &str) -> bool {
    let pattern: Vec<&str> = pattern.split('.').collect();
    let event: Vec<&str> = event.split('.').collect();

    for (i, segment) in pattern.iter().enumerate() {
        let is_last = i + 1 == pattern.len();
        if *segment == "*" && is_last {
            return event.len() >= i;
        }
        match event.get(i) {
            Some(actual) if *segment == "*" || segment == actual => {}
            _ => return false,
        }
    }

    pattern.len() == event.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("push", "push", true)]
    #[case("push", "Push", false)]
    #[case("issues", "issues.opened", false)]
    #[case("issues.opened", "issues.opened", true)]
    #[case("issues.opened", "issues.closed", false)]
    #[case("issues.opened", "issues", false)]
    #[case("issues.*", "issues.opened", true)]
    #[case("issues.*", "issues.deleted", true)]
    #[case("issues.*", "issues", true)]
    #[case("issues.*", "issue_comment.created", false)]
    #[case("*", "push", true)]
    #[case("*", "pull_request.closed", true)]
    #[case("*.opened", "issues.opened", true)]
    #[case("*.opened", "pull_request.opened", true)]
    #[case("*.opened", "issues.closed", false)]
    #[case("*.opened", "push", false)]
    #[case("pull_request.*.x", "pull_request.closed.x", true)]
    #[case("pull_request.*.x", "pull_request.x", false)]
    fn test_pattern_matches(#[case] pattern: &str, #[case] event: &str, #[case] expected: bool) {
        assert_eq!(pattern_matches(pattern, event), expected);
    }
}

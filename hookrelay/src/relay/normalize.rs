//! Size limits for outgoing chat embeds.
//!
//! Components are cut in a fixed order (title, description, fields, footer,
//! author name), each to the smaller of its own limit and what is left of the
//! total. Once the total is spent, later components are emptied. Lengths are
//! counted in Unicode scalar values.

use gh_render::NotificationMessage;

pub const TOTAL_LIMIT: usize = 6000;
pub const TITLE_LIMIT: usize = 256;
pub const DESCRIPTION_LIMIT: usize = 4096;
pub const FIELDS_MAX_COUNT: usize = 25;
pub const FIELD_NAME_LIMIT: usize = 256;
pub const FIELD_VALUE_LIMIT: usize = 1024;
pub const FOOTER_LIMIT: usize = 2048;
pub const AUTHOR_NAME_LIMIT: usize = 256;

struct Budget {
    used: usize,
}

impl Budget {
    fn remaining(&self) -> usize {
        TOTAL_LIMIT.saturating_sub(self.used)
    }

    fn cut(&mut self, text: &str, limit: usize) -> String {
        let allowed = limit.min(self.remaining());
        let cut: String = text.chars().take(allowed).collect();
        self.used += cut.chars().count();
        cut
    }

    fn cut_optional(&mut self, text: Option<String>, limit: usize) -> Option<String> {
        let cut = self.cut(&text?, limit);
        (!cut.is_empty()).then_some(cut)
    }
}

/// Fit `message` within the embed limits.
///
/// Idempotent: a normalized message passes through unchanged. Fields beyond
/// the count cap are dropped from the tail; the capped fields are all kept,
/// with empty name and value once the total is spent. An optional part
/// emptied by the budget becomes `None`.
pub fn normalize(mut message: NotificationMessage) -> NotificationMessage {
    let mut budget = Budget { used: 0 };

    message.title = budget.cut(&message.title, TITLE_LIMIT);
    message.description = budget.cut_optional(message.description, DESCRIPTION_LIMIT);

    message.fields.truncate(FIELDS_MAX_COUNT);
    for field in &mut message.fields {
        field.name = budget.cut(&field.name, FIELD_NAME_LIMIT);
        field.value = budget.cut(&field.value, FIELD_VALUE_LIMIT);
    }

    message.footer = budget.cut_optional(message.footer, FOOTER_LIMIT);

    message.author = message.author.and_then(|mut author| {
        author.name = budget.cut(&author.name, AUTHOR_NAME_LIMIT);
        (!author.name.is_empty()).then_some(author)
    });

    message
}

/// Characters counted against [`TOTAL_LIMIT`].
pub fn total_chars(message: &NotificationMessage) -> usize {
    let count = |s: &str| s.chars().count();
    count(&message.title)
        + message.description.as_deref().map_or(0, count)
        + message
            .fields
            .iter()
            .map(|f| count(&f.name) + count(&f.value))
            .sum::<usize>()
        + message.footer.as_deref().map_or(0, count)
        + message.author.as_ref().map_or(0, |a| count(&a.name))
}

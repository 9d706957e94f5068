//! Prompt templates for content generation

use clubrag_core::{EventDetails, TrendItem};

/// Fallback when the profile carries no `name`.
pub const DEFAULT_ORGANIZATION: &str = "our organization";

/// Everything that goes into a content-generation prompt.
#[derive(Debug, Clone, Copy)]
pub struct ContentPrompt<'a> {
    /// Organization display name.
    pub organization: &'a str,
    /// Retrieved chunks, newline-separated, best match first.
    pub context: &'a str,
    /// The event being promoted.
    pub event: &'a EventDetails,
    /// Hashtags to weave in.
    pub hashtags: &'a [String],
    /// Trending videos to draw on.
    pub trends: &'a [TrendItem],
}

/// Render the event fields, one `label: value` line each.
pub fn render_event(event: &EventDetails) -> String {
    event
        .fields()
        .iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render trend items, one line each.
pub fn render_trends(trends: &[TrendItem]) -> String {
    trends
        .iter()
        .map(TrendItem::prompt_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the social-media content prompt
pub fn build_content_prompt(p: &ContentPrompt<'_>) -> String {
    format!(
        r#"You are a social media strategist for {organization}, a student club.

Club context:
{context}

Event details:
{event}

Instagram hashtags: {hashtags}

YouTube trends:
{trends}

1. Suggest 3 poster content ideas for this event.
2. Suggest 2 trending reel ideas (with themes).
3. Suggest 3 suitable audio tracks with reasons.
4. Merge Instagram & YouTube hashtags into one set.

Keep the content authentic to the club's voice and use the trending hashtags where they fit."#,
        organization = p.organization,
        context = p.context,
        event = render_event(p.event),
        hashtags = p.hashtags.join(", "),
        trends = render_trends(p.trends),
    )
}

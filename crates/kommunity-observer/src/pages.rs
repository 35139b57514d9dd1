//! Server-rendered HTML pages.
//!
//! Two `minijinja` templates: the topic index and a single topic with its
//! replies. Template names end in `.html`, so every interpolated value is
//! HTML-escaped. Links percent-encode the location; legacy file names often
//! carry `?` or `#`.

use chrono::{DateTime, Utc};
use kommunity_types::{Reply, Topic, TopicSummary, ellipsize};
use minijinja::{Environment, context};
use serde::Serialize;

/// Longest listing snippet, in characters.
pub const SNIPPET_CHARS: usize = 160;

const INDEX: &str = "index.html";
const TOPIC: &str = "topic.html";

const STYLE: &str = "<style>
  body { background: #0d1117; color: #c9d1d9; font-family: system-ui, sans-serif;
         padding: 2rem; max-width: 820px; margin: 0 auto; }
  a { color: #58a6ff; text-decoration: none; }
  .topic, .reply { border-bottom: 1px solid #30363d; padding: 0.75rem 0; }
  .meta { color: #8b949e; font-size: 0.85rem; }
  .tag { background: #161b22; border-radius: 4px; padding: 0 0.4rem; margin-right: 0.3rem; }
  .body { white-space: pre-wrap; }
</style>";

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Kommunity</title>
  {{ style|safe }}
</head>
<body>
  <h1>Kommunity</h1>
  <p class="meta">{{ count }} topic{% if count != 1 %}s{% endif %}</p>
  {% for t in topics %}
  <div class="topic">
    <h2>{% if t.location %}<a href="/topic/{{ t.location|urlencode }}">{{ t.title }}</a>{% else %}{{ t.title }}{% endif %}</h2>
    <p class="meta">by {{ t.author }} &middot; <span title="{{ t.created_at }}">{{ t.when }}</span> &middot; {{ t.reply_count }} repl{% if t.reply_count == 1 %}y{% else %}ies{% endif %}</p>
    <p>{{ t.snippet }}</p>
    {% if t.tags %}<p>{% for tag in t.tags %}<span class="tag">{{ tag }}</span>{% endfor %}</p>{% endif %}
  </div>
  {% else %}
  <p>No topics yet.</p>
  {% endfor %}
</body>
</html>"#;

const TOPIC_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{ topic.title }} - Kommunity</title>
  {{ style|safe }}
</head>
<body>
  <p><a href="/">&larr; All topics</a></p>
  <h1>{{ topic.title }}</h1>
  <p class="meta">by {{ topic.author }} &middot; <span title="{{ topic.created_at }}">{{ topic.when }}</span> &middot; {{ location }}</p>
  {% if topic.tags %}<p>{% for tag in topic.tags %}<span class="tag">{{ tag }}</span>{% endfor %}</p>{% endif %}
  <p class="body">{{ topic.body }}</p>
  <h2>{{ topic.replies|length }} repl{% if topic.replies|length == 1 %}y{% else %}ies{% endif %}</h2>
  {% for reply in topic.replies %}
  <div class="reply">
    <p class="meta">{{ loop.index }}. {{ reply.author }} &middot; <span title="{{ reply.created_at }}">{{ reply.when }}</span></p>
    <p class="body">{{ reply.content }}</p>
  </div>
  {% endfor %}
</body>
</html>"#;

/// Render an ISO-8601 timestamp as `Jan 2, 2006 15:04 UTC`.
///
/// Unparsable input is returned unchanged; empty input stays empty.
pub fn format_time(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    DateTime::parse_from_rfc3339(raw).map_or_else(
        |_| raw.to_owned(),
        |t| t.with_timezone(&Utc).format("%b %-d, %Y %H:%M UTC").to_string(),
    )
}

/// Listing projection of `topic`.
pub fn summarize(topic: &Topic) -> TopicSummary {
    TopicSummary {
        title: topic.title.clone(),
        author: topic.author.clone(),
        created_at: topic.created_at.clone(),
        when: format_time(&topic.created_at),
        snippet: ellipsize(topic.body.trim(), SNIPPET_CHARS),
        tags: topic.tags.clone(),
        reply_count: topic.reply_count(),
        location: topic.location().cloned(),
    }
}

#[derive(Serialize)]
struct ReplyView<'a> {
    author: &'a str,
    content: &'a str,
    created_at: &'a str,
    when: String,
}

impl<'a> From<&'a Reply> for ReplyView<'a> {
    fn from(reply: &'a Reply) -> Self {
        Self {
            author: &reply.author,
            content: &reply.content,
            created_at: &reply.created_at,
            when: format_time(&reply.created_at),
        }
    }
}

#[derive(Serialize)]
struct TopicView<'a> {
    title: &'a str,
    body: &'a str,
    author: &'a str,
    created_at: &'a str,
    when: String,
    tags: &'a [String],
    replies: Vec<ReplyView<'a>>,
}

/// Compiled page templates.
pub struct PageRenderer {
    env: Environment<'static>,
}

impl std::fmt::Debug for PageRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRenderer").finish_non_exhaustive()
    }
}

impl PageRenderer {
    /// Compile the built-in templates.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(INDEX, INDEX_TEMPLATE)?;
        env.add_template(TOPIC, TOPIC_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Render the topic index.
    pub fn index(&self, topics: &[TopicSummary]) -> Result<String, minijinja::Error> {
        self.env.get_template(INDEX)?.render(context! {
            style => STYLE,
            count => topics.len(),
            topics => topics,
        })
    }

    /// Render a single topic with all of its replies.
    pub fn topic(&self, topic: &Topic) -> Result<String, minijinja::Error> {
        let view = TopicView {
            title: &topic.title,
            body: &topic.body,
            author: &topic.author,
            created_at: &topic.created_at,
            when: format_time(&topic.created_at),
            tags: &topic.tags,
            replies: topic.replies.iter().map(ReplyView::from).collect(),
        };
        let location = topic.location().map(ToString::to_string).unwrap_or_default();
        self.env.get_template(TOPIC)?.render(context! {
            style => STYLE,
            topic => view,
            location => location,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kommunity_types::Location;

    use super::*;

    #[test]
    fn time_is_humanized() {
        assert_eq!(format_time("2024-01-02T15:04:05Z"), "Jan 2, 2024 15:04 UTC");
        assert_eq!(format_time("2024-01-02T17:04:05+02:00"), "Jan 2, 2024 15:04 UTC");
        assert_eq!(format_time("yesterday"), "yesterday");
        assert_eq!(format_time(""), "");
    }

    #[test]
    fn snippet_is_trimmed_and_capped() {
        let mut topic = Topic::new("T", format!("  {}  ", "a".repeat(200)), "x", "");
        topic.assign_location(Location::new("t.json"));
        let summary = summarize(&topic);
        assert_eq!(summary.snippet.chars().count(), SNIPPET_CHARS);
        assert!(summary.snippet.starts_with("aaa"));
        assert!(summary.snippet.ends_with("..."));
        assert_eq!(summary.location, Some(Location::new("t.json")));
    }

    #[test]
    fn pages_escape_generated_text() {
        let pages = PageRenderer::new().unwrap();
        let mut topic = Topic::new("<script>x</script>", "body & more", "a", "2024-01-01T00:00:00Z");
        topic.replies.push(Reply::now("b", "<b>hi</b>"));

        let html = pages.topic(&topic).unwrap();
        assert!(!html.contains("<script>x</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<b>hi"));
        assert!(html.contains("&lt;b&gt;hi&lt;&#x2f;b&gt;"));
        assert!(html.contains("1 reply"));

        let index = pages.index(&[summarize(&topic)]).unwrap();
        assert!(index.contains("1 topic<"));
        assert!(!index.contains("<script>x"));
    }

    #[test]
    fn index_links_percent_encode_locations() {
        let pages = PageRenderer::new().unwrap();
        let mut topic = Topic::new("What is Rust?", "body", "a", "2024-01-01T00:00:00Z");
        topic.assign_location(Location::new("what_is_rust?.json"));

        let html = pages.index(&[summarize(&topic)]).unwrap();
        assert!(html.contains("href=\"/topic/what"));
        assert!(html.contains("rust%3F"));
        assert!(!html.contains("rust?.json"));
    }

    #[test]
    fn empty_index_says_so() {
        let pages = PageRenderer::new().unwrap();
        let html = pages.index(&[]).unwrap();
        assert!(html.contains("No topics yet."));
        assert!(html.contains("0 topics"));
    }
}

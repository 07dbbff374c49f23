//! HTML pages, rendered with compile-time askama templates from
//! `templates/`. Askama escapes every interpolated value.

use askama::Template;

use board_types::models::Message;

/// Messages longer than this get the `long-text` class.
const LONG_TEXT_CHARS: usize = 100;

/// One rendered list entry.
struct Item<'a> {
    id: i64,
    content: &'a str,
    iso: String,
    shown: String,
    long: bool,
}

impl<'a> Item<'a> {
    fn new(msg: &'a Message) -> Self {
        Self {
            id: msg.id,
            content: &msg.content,
            iso: msg.created_at.to_rfc3339(),
            shown: msg.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            long: msg.content.chars().count() > LONG_TEXT_CHARS,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexPage<'a> {
    messages: Vec<Item<'a>>,
    favorites: Vec<Item<'a>>,
}

#[derive(Template)]
#[template(path = "recommend.html")]
struct RecommendPage<'a> {
    favorites: Vec<Item<'a>>,
}

pub fn index_page(messages: &[Message], favorites: &[Message]) -> askama::Result<String> {
    IndexPage {
        messages: messages.iter().map(Item::new).collect(),
        favorites: favorites.iter().map(Item::new).collect(),
    }
    .render()
}

pub fn recommend_page(favorites: &[Message]) -> askama::Result<String> {
    RecommendPage {
        favorites: favorites.iter().map(Item::new).collect(),
    }
    .render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn msg(id: i64, content: &str) -> Message {
        Message {
            id,
            content: content.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn content_is_escaped() {
        let page = index_page(&[msg(1, "<script>alert('x')</script>")], &[]).unwrap();
        assert!(!page.contains("<script>alert"));
        assert!(page.contains("&lt;script&gt;alert("));
    }

    #[test]
    fn empty_lists_render_empty() {
        let page = index_page(&[], &[]).unwrap();
        assert!(page.contains("<ul id=\"contentList\"></ul>"));
        assert!(page.contains("<ul id=\"favoriteList\"></ul>"));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn messages_keep_given_order() {
        let page = index_page(&[msg(2, "newer"), msg(1, "older")], &[]).unwrap();
        let newer = page.find("message-2").unwrap();
        let older = page.find("message-1").unwrap();
        assert!(newer < older);
        assert!(page.contains("2024-01-02 03:04:05"));
    }

    #[test]
    fn long_messages_are_flagged() {
        let long = "x".repeat(LONG_TEXT_CHARS + 1);
        let page = index_page(&[msg(1, &long), msg(2, "short")], &[]).unwrap();
        assert!(page.contains("<li id=\"message-1\" class=\"long-text\">"));
        assert!(page.contains("<li id=\"message-2\">"));
    }

    #[test]
    fn slot_markers_in_content_stay_literal() {
        let page = index_page(&[msg(1, "{{favorites}}")], &[msg(2, "fav")]).unwrap();
        assert_eq!(page.matches("favorite-2").count(), 1);
        assert!(page.contains(">{{favorites}}<"));
    }

    #[test]
    fn recommend_page_lists_favorites() {
        let page = recommend_page(&[msg(5, "pick")]).unwrap();
        assert!(page.contains("id=\"favorite-5\""));
        assert!(page.contains(">pick<"));
    }
}

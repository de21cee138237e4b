//! Main-branch report generation.
//!
//! A report lists every surviving top-level comment of a post ("branch")
//! with its full text, followed by a bounded number of its direct replies.
//! Building a report is a pure function of the post, its comments and the
//! options, apart from two reads of the local clock.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::constants::DELETED_SENTINEL;
use crate::reddit::{Comment, CommentTree, Post, PostKind};

const HEAVY_RULE: &str = "=";
const BRANCH_RULE: &str = "─";
const REPLY_RULE: &str = "┈";
const REPLIES_OPEN: &str = "▼";
const REPLIES_CLOSE: &str = "▲";

/// Post hints that mark an embedded image or video.
const MEDIA_HINTS: [&str; 3] = ["image", "rich:video", "hosted:video"];

/// Display options for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Maximum number of direct replies shown under each branch.
    pub replies_per_branch: usize,
    pub include_scores: bool,
    pub include_authors: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            replies_per_branch: 10,
            include_scores: true,
            include_authors: true,
        }
    }
}

/// A finished report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub lines: Vec<String>,
    pub filename: String,
    pub branch_count: usize,
}

impl Report {
    /// The report as a single newline-joined document.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Build a report stamped with the local time.
#[must_use]
pub fn build_report(post: &Post, tree: &CommentTree, options: &FormatOptions) -> Report {
    build_report_with_clock(post, tree, options, || Local::now().naive_local())
}

/// Build a report reading timestamps from `now`.
///
/// `now` is called once before any output is produced (for the filename) and
/// once after the last branch (for the footer).
pub fn build_report_with_clock<F>(
    post: &Post,
    tree: &CommentTree,
    options: &FormatOptions,
    mut now: F,
) -> Report
where
    F: FnMut() -> NaiveDateTime,
{
    let started = now();
    let total_comments = tree.total_count();
    let mut lines = Vec::new();

    // Header
    lines.push(format!("POST: {}", post.title));
    lines.push(format!("SUBREDDIT: r/{}", post.subreddit));
    lines.push(format!(
        "AUTHOR: {}",
        author_marker(post.author.as_deref(), options.include_authors)
    ));
    lines.push(format!("URL: {}", post.url));
    if options.include_scores {
        lines.push(format!("SCORE: {} upvotes", post.score));
    }
    lines.push(String::new());
    lines.push("BODY:".to_string());
    let body = resolve_op_body(post);
    lines.push(if body.is_empty() {
        "(no body)".to_string()
    } else {
        body
    });
    lines.push(String::new());
    lines.push(format!("TOTAL COMMENTS: {total_comments}"));
    lines.push(HEAVY_RULE.repeat(100));
    lines.push("MAIN COMMENT BRANCHES - FULL TEXT".to_string());
    lines.push(HEAVY_RULE.repeat(100));
    lines.push(String::new());

    let mut branch_count = 0;
    for comment in tree.comments.iter().filter(|c| c.has_visible_body()) {
        branch_count += 1;
        push_branch(&mut lines, branch_count, comment, options);
    }

    // Footer
    let finished = now();
    lines.push("📊 SUMMARY:".to_string());
    lines.push(format!("• Total main branches: {branch_count}"));
    lines.push(format!("• Total comments: {}", tree.total_count()));
    lines.push(format!(
        "• Generated: {}",
        finished.format("%Y-%m-%d %H:%M:%S")
    ));

    Report {
        lines,
        filename: format!(
            "reddit_main_branches_{}.txt",
            started.format("%Y%m%d_%H%M%S")
        ),
        branch_count,
    }
}

/// Pick the text shown under `BODY:` for a post.
#[must_use]
pub fn resolve_op_body(post: &Post) -> String {
    if post.selftext.is_empty() {
        if let Some(parent) = &post.crosspost_parent {
            if !parent.selftext.is_empty() {
                return parent.selftext.clone();
            }
        }
    }

    match &post.kind {
        PostKind::SelfPost if post.selftext.is_empty() => "(self post with no body)".to_string(),
        PostKind::SelfPost => post.selftext.clone(),
        PostKind::Gallery(gallery) => {
            format!("(gallery post with {} images) {}", gallery.items.len(), post.url)
        }
        PostKind::Video(_) => format!("(media post) {}", post.url),
        PostKind::Link
            if post
                .post_hint
                .as_deref()
                .is_some_and(|hint| MEDIA_HINTS.contains(&hint)) =>
        {
            format!("(media post) {}", post.url)
        }
        PostKind::Link => format!("(link post) {}", post.url),
    }
}

fn push_branch(lines: &mut Vec<String>, index: usize, comment: &Comment, options: &FormatOptions) {
    let author = comment.author.as_deref().unwrap_or(DELETED_SENTINEL);
    let score = comment.score.unwrap_or(0);
    let reply_count = comment.descendant_count();

    lines.push(format!("🌳 BRANCH #{index}"));
    if options.include_authors {
        lines.push(format!("👤 Author: u/{author}"));
    }
    if options.include_scores {
        lines.push(format!("⬆️  Score: {score} points"));
    }
    lines.push(format!("💬 Replies: {reply_count}"));
    lines.push(BRANCH_RULE.repeat(80));
    lines.push("MAIN COMMENT:".to_string());
    lines.push(comment.body.clone().unwrap_or_default());
    lines.push(BRANCH_RULE.repeat(80));
    lines.push(String::new());

    let cap = options.replies_per_branch;
    if !comment.replies.is_empty() && reply_count > 0 && cap > 0 {
        lines.push(format!("📝 TOP {} REPLIES:", cap.min(reply_count)));
        lines.push(REPLIES_OPEN.repeat(80));

        let mut shown = 0;
        for reply in &comment.replies {
            if shown >= cap {
                // Counted against the whole subtree, not just direct replies.
                let remaining = reply_count.saturating_sub(cap);
                if remaining > 0 {
                    lines.push(format!("\n... and {remaining} more replies ..."));
                }
                break;
            }

            if !reply.has_visible_body() {
                continue;
            }

            shown += 1;
            lines.push(format!(
                "\n🔹 REPLY #{shown}{}:",
                reply_meta(reply, options)
            ));
            lines.push(reply.body.clone().unwrap_or_default());
            lines.push(REPLY_RULE.repeat(60));
        }

        lines.push(REPLIES_CLOSE.repeat(80));
    }

    lines.push(format!("\n{}", HEAVY_RULE.repeat(100)));
    lines.push(String::new());
}

/// Parenthesized author/score suffix for a reply heading.
fn reply_meta(reply: &Comment, options: &FormatOptions) -> String {
    let mut parts = Vec::with_capacity(2);
    if options.include_authors {
        parts.push(format!(
            "u/{}",
            reply.author.as_deref().unwrap_or(DELETED_SENTINEL)
        ));
    }
    if options.include_scores {
        parts.push(format!("{} pts", reply.score.unwrap_or(0)));
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(" "))
    }
}

fn author_marker(author: Option<&str>, include_authors: bool) -> String {
    match (include_authors, author) {
        (false, _) => "[hidden]".to_string(),
        (true, Some(name)) => format!("u/{name}"),
        (true, None) => DELETED_SENTINEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reddit::models::{Gallery, GalleryItem};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn post(kind: PostKind) -> Post {
        Post {
            id: "abc".to_string(),
            title: "A title".to_string(),
            subreddit: "rust".to_string(),
            author: Some("op".to_string()),
            url: "https://www.reddit.com/r/rust/comments/abc/a_title/".to_string(),
            permalink: "/r/rust/comments/abc/a_title/".to_string(),
            score: 42,
            selftext: String::new(),
            post_hint: None,
            kind,
            preview: None,
            crosspost_parent: None,
        }
    }

    fn comment(id: &str, body: &str) -> Comment {
        Comment {
            id: id.to_string(),
            author: Some(format!("user_{id}")),
            body: Some(body.to_string()),
            score: Some(5),
            replies: Vec::new(),
        }
    }

    fn with_replies(mut parent: Comment, replies: Vec<Comment>) -> Comment {
        parent.replies = replies;
        parent
    }

    fn build(tree: &CommentTree, options: &FormatOptions) -> Report {
        let mut calls = 0;
        build_report_with_clock(&post(PostKind::SelfPost), tree, options, || {
            calls += 1;
            if calls == 1 {
                at(10, 0, 0)
            } else {
                at(10, 0, 7)
            }
        })
    }

    #[test]
    fn test_empty_tree() {
        let report = build(&CommentTree::default(), &FormatOptions::default());
        let text = report.text();

        assert_eq!(report.branch_count, 0);
        assert!(text.contains("• Total main branches: 0"));
        assert!(text.contains("TOTAL COMMENTS: 0"));
        assert!(!text.contains("BRANCH #"));
    }

    #[test]
    fn test_timestamps_are_read_separately() {
        let report = build(&CommentTree::default(), &FormatOptions::default());
        assert_eq!(report.filename, "reddit_main_branches_20240309_100000.txt");
        assert_eq!(
            report.lines.last().map(String::as_str),
            Some("• Generated: 2024-03-09 10:00:07")
        );
    }

    #[test]
    fn test_header_layout() {
        let report = build(&CommentTree::default(), &FormatOptions::default());
        assert_eq!(report.lines[0], "POST: A title");
        assert_eq!(report.lines[1], "SUBREDDIT: r/rust");
        assert_eq!(report.lines[2], "AUTHOR: u/op");
        assert_eq!(report.lines[4], "SCORE: 42 upvotes");
        assert_eq!(report.lines[6], "BODY:");
        assert_eq!(report.lines[7], "(self post with no body)");
        assert_eq!(report.lines[9], "TOTAL COMMENTS: 0");
        assert_eq!(report.lines[10], "=".repeat(100));
        assert_eq!(report.lines[11], "MAIN COMMENT BRANCHES - FULL TEXT");
    }

    #[test]
    fn test_header_hides_author_and_score() {
        let options = FormatOptions {
            include_authors: false,
            include_scores: false,
            ..FormatOptions::default()
        };
        let report = build(&CommentTree::default(), &options);
        assert_eq!(report.lines[2], "AUTHOR: [hidden]");
        assert!(!report.text().contains("upvotes"));
    }

    #[test]
    fn test_deleted_op_author() {
        let mut p = post(PostKind::SelfPost);
        p.author = None;
        let report = build_report(&p, &CommentTree::default(), &FormatOptions::default());
        assert_eq!(report.lines[2], "AUTHOR: [deleted]");
    }

    #[test]
    fn test_branch_count_skips_deleted_and_bodiless() {
        let mut bodiless = comment("x", "");
        bodiless.body = None;
        let tree = CommentTree::new(vec![
            comment("a", "first"),
            comment("b", "[deleted]"),
            bodiless,
            comment("c", "second"),
        ]);
        let report = build(&tree, &FormatOptions::default());
        let text = report.text();

        assert_eq!(report.branch_count, 2);
        assert!(text.contains("🌳 BRANCH #1"));
        assert!(text.contains("🌳 BRANCH #2"));
        assert!(!text.contains("🌳 BRANCH #3"));
        assert!(text.contains("TOTAL COMMENTS: 4"));
        assert!(text.contains("• Total comments: 4"));
    }

    #[test]
    fn test_branch_block_layout() {
        let tree = CommentTree::new(vec![comment("a", "Line one\n<b>&amp;</b>")]);
        let report = build(&tree, &FormatOptions::default());
        let start = report
            .lines
            .iter()
            .position(|l| l == "🌳 BRANCH #1")
            .unwrap();

        assert_eq!(
            &report.lines[start..start + 10],
            &[
                "🌳 BRANCH #1".to_string(),
                "👤 Author: u/user_a".to_string(),
                "⬆️  Score: 5 points".to_string(),
                "💬 Replies: 0".to_string(),
                "─".repeat(80),
                "MAIN COMMENT:".to_string(),
                "Line one\n<b>&amp;</b>".to_string(),
                "─".repeat(80),
                String::new(),
                format!("\n{}", "=".repeat(100)),
            ]
        );
    }

    #[test]
    fn test_replies_section() {
        let mut deleted = comment("r2", "[deleted]");
        deleted.author = None;
        let tree = CommentTree::new(vec![with_replies(
            comment("a", "top"),
            vec![comment("r1", "one"), deleted, comment("r3", "three")],
        )]);
        let report = build(&tree, &FormatOptions::default());
        let text = report.text();

        assert!(text.contains("📝 TOP 3 REPLIES:"));
        assert!(text.contains("\n🔹 REPLY #1 (u/user_r1 5 pts):\none\n"));
        assert!(text.contains("\n🔹 REPLY #2 (u/user_r3 5 pts):\nthree\n"));
        assert!(!text.contains("REPLY #3"));
        assert!(!text.contains("more replies"));
        assert!(text.contains(&"▲".repeat(80)));
    }

    #[test]
    fn test_reply_meta_variants() {
        let tree = CommentTree::new(vec![with_replies(
            comment("a", "top"),
            vec![comment("r1", "one")],
        )]);

        let scores_only = FormatOptions {
            include_authors: false,
            ..FormatOptions::default()
        };
        assert!(build(&tree, &scores_only).text().contains("🔹 REPLY #1 (5 pts):"));

        let bare = FormatOptions {
            include_authors: false,
            include_scores: false,
            ..FormatOptions::default()
        };
        assert!(build(&tree, &bare).text().contains("🔹 REPLY #1:"));
    }

    #[test]
    fn test_hidden_authors_never_leak() {
        let tree = CommentTree::new(vec![with_replies(
            comment("a", "top"),
            vec![comment("r1", "one"), comment("r2", "two")],
        )]);
        let options = FormatOptions {
            include_authors: false,
            ..FormatOptions::default()
        };
        let text = build(&tree, &options).text();
        assert!(!text.contains("user_"));
        assert!(!text.contains("u/op"));
    }

    #[test]
    fn test_zero_cap_skips_replies() {
        let tree = CommentTree::new(vec![with_replies(
            comment("a", "top"),
            vec![comment("r1", "one")],
        )]);
        let options = FormatOptions {
            replies_per_branch: 0,
            ..FormatOptions::default()
        };
        let text = build(&tree, &options).text();
        assert!(!text.contains("REPLIES:"));
        assert!(text.contains("💬 Replies: 1"));
    }

    #[test]
    fn test_remaining_uses_subtree_count() {
        // 11 direct replies, one of which has a reply of its own: subtree 12.
        let mut replies: Vec<Comment> = (0..11).map(|i| comment(&format!("r{i}"), "reply")).collect();
        replies[0].replies = vec![comment("nested", "deep")];
        let tree = CommentTree::new(vec![with_replies(comment("a", "top"), replies)]);

        let text = build(&tree, &FormatOptions::default()).text();
        assert!(text.contains("💬 Replies: 12"));
        assert!(text.contains("📝 TOP 10 REPLIES:"));
        assert!(text.contains("\n... and 2 more replies ..."));
        assert!(text.contains("🔹 REPLY #10 "));
        assert!(!text.contains("🔹 REPLY #11"));
    }

    #[test]
    fn test_no_remaining_line_when_direct_replies_exhausted() {
        // Two direct replies with deep subtrees: cap reached only after the last one.
        let deep = |id: &str| with_replies(comment(id, "reply"), vec![comment("n", "x")]);
        let tree = CommentTree::new(vec![with_replies(
            comment("a", "top"),
            vec![deep("r1"), deep("r2")],
        )]);
        let options = FormatOptions {
            replies_per_branch: 2,
            ..FormatOptions::default()
        };
        let text = build(&tree, &options).text();
        assert!(text.contains("📝 TOP 2 REPLIES:"));
        assert!(!text.contains("more replies"));
    }

    #[test]
    fn test_total_comments_stable_across_runs() {
        let tree = CommentTree::new(vec![with_replies(
            comment("a", "top"),
            vec![comment("r1", "one")],
        )]);
        let first = build(&tree, &FormatOptions::default());
        let second = build(&tree, &FormatOptions::default());

        let footer_total = first
            .lines
            .iter()
            .find_map(|l| l.strip_prefix("• Total comments: "))
            .unwrap();
        let header_total = second
            .lines
            .iter()
            .find_map(|l| l.strip_prefix("TOTAL COMMENTS: "))
            .unwrap();
        assert_eq!(footer_total, header_total);
        assert_eq!(first, second);
    }

    #[test]
    fn test_op_body_variants() {
        let mut self_post = post(PostKind::SelfPost);
        self_post.selftext = "hello".to_string();
        assert_eq!(resolve_op_body(&self_post), "hello");

        let gallery = post(PostKind::Gallery(Gallery {
            items: vec![
                GalleryItem {
                    media_id: "a".to_string(),
                    media: None,
                },
                GalleryItem {
                    media_id: "b".to_string(),
                    media: None,
                },
            ],
        }));
        assert_eq!(
            resolve_op_body(&gallery),
            "(gallery post with 2 images) https://www.reddit.com/r/rust/comments/abc/a_title/"
        );

        let video = post(PostKind::Video(None));
        assert!(resolve_op_body(&video).starts_with("(media post) "));

        let mut image = post(PostKind::Link);
        image.post_hint = Some("image".to_string());
        assert!(resolve_op_body(&image).starts_with("(media post) "));

        let link = post(PostKind::Link);
        assert!(resolve_op_body(&link).starts_with("(link post) "));
    }

    #[test]
    fn test_op_body_from_crosspost_parent() {
        let mut parent = post(PostKind::SelfPost);
        parent.selftext = "original text".to_string();
        let mut crosspost = post(PostKind::Link);
        crosspost.crosspost_parent = Some(Box::new(parent));
        assert_eq!(resolve_op_body(&crosspost), "original text");
    }
}

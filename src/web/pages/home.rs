//! The extractor page: input form plus the last result for this session.

use maud::{html, Markup, Render};

use crate::components::{Alert, BaseLayout, Button, Checkbox, Form, FormGroup, Input};
use crate::constants::PREVIEW_CHARS;
use crate::report::FormatOptions;
use crate::web::session::{ExtractionResult, MediaOutcome};

/// Parameters for rendering the extractor page.
#[derive(Debug, Clone)]
pub struct HomePageParams<'a> {
    /// Value echoed into the URL field.
    pub url: &'a str,
    pub options: FormatOptions,
    pub include_media: bool,
    /// Upper bound for the replies-per-branch field.
    pub max_replies: usize,
    pub error: Option<&'a str>,
    pub result: Option<&'a ExtractionResult>,
}

impl<'a> HomePageParams<'a> {
    #[must_use]
    pub fn new(options: FormatOptions, max_replies: usize) -> Self {
        Self {
            url: "",
            options,
            include_media: false,
            max_replies,
            error: None,
            result: None,
        }
    }

    #[must_use]
    pub fn url(mut self, url: &'a str) -> Self {
        self.url = url;
        self
    }

    #[must_use]
    pub fn include_media(mut self, include_media: bool) -> Self {
        self.include_media = include_media;
        self
    }

    #[must_use]
    pub fn error(mut self, error: &'a str) -> Self {
        self.error = Some(error);
        self
    }

    #[must_use]
    pub fn result(mut self, result: Option<&'a ExtractionResult>) -> Self {
        self.result = result;
        self
    }
}

/// Render the full extractor page.
#[must_use]
pub fn render_home_page(params: &HomePageParams<'_>) -> Markup {
    let content = html! {
        @if let Some(err) = params.error {
            (Alert::error(err).with_title("Error:"))
        }

        (render_extract_form(params))

        @if let Some(result) = params.result {
            (render_result(result))
        }
    };

    BaseLayout::new("Reddit Main Branches Extractor")
        .with_subtitle("Extract every top-level comment thread of a post with its leading replies.")
        .render(content)
}

fn render_extract_form(params: &HomePageParams<'_>) -> Markup {
    let options = &params.options;
    let fields = html! {
        div class="row" {
            (FormGroup::new(
                Input::url("url")
                    .id("url")
                    .value(params.url)
                    .placeholder("https://www.reddit.com/r/subreddit/comments/abc123/title/")
                    .required()
                    .render(),
            )
            .label("Reddit post URL", "url")
            .class("grow"))

            (FormGroup::new(
                Input::number("replies_per_branch")
                    .id("replies_per_branch")
                    .value(options.replies_per_branch)
                    .range(0, params.max_replies)
                    .render(),
            )
            .label("Replies per branch", "replies_per_branch")
            .help("How many replies to list under each main comment"))
        }

        fieldset {
            (Checkbox::new("include_scores", "Include scores").checked(options.include_scores))
            (Checkbox::new("include_authors", "Include authors").checked(options.include_authors))
            (Checkbox::new("include_media", "Download post media as zip").checked(params.include_media))
        }

        (Button::primary("🚀 Run Extraction").r#type("submit").class("btn-block"))
    };

    Form::post("/extract", fields).id("extract-form").render()
}

fn render_result(result: &ExtractionResult) -> Markup {
    let summary = format!("Extracted {} main comment branches.", result.branch_count);

    html! {
        section id="result" {
            (Alert::success(&summary).with_title("Done!"))

            div class="downloads" {
                (Button::primary("📥 Download report (.txt)")
                    .href("/download/report")
                    .download(&result.report_filename))

                @if let Some(archive) = result.media.archive() {
                    (Button::outline("🖼️ Download media (.zip)")
                        .href("/download/media")
                        .download(&archive.filename))
                }
            }

            @match &result.media {
                MediaOutcome::Unavailable => {
                    (Alert::info("No media available for this post."))
                }
                MediaOutcome::Failed(reason) => {
                    (Alert::warning(reason).with_title("Media archive failed:"))
                }
                MediaOutcome::NotRequested | MediaOutcome::Ready(_) => {}
            }

            h2 { "Preview" }
            pre class="report-preview" { (preview_text(&result.report_text)) }
        }
    }
}

/// First `PREVIEW_CHARS` characters of the report, marked when cut short.
#[must_use]
pub fn preview_text(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}\n\n... (truncated)", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaArchive;

    fn result(media: MediaOutcome) -> ExtractionResult {
        ExtractionResult {
            report_text: "POST: Hello".to_string(),
            report_filename: "reddit_main_branches_20240101_000000.txt".to_string(),
            branch_count: 3,
            media,
        }
    }

    #[test]
    fn test_preview_text_short() {
        assert_eq!(preview_text("short"), "short");
        let exact = "a".repeat(PREVIEW_CHARS);
        assert_eq!(preview_text(&exact), exact);
    }

    #[test]
    fn test_preview_text_truncates_on_chars() {
        let long = "🌳".repeat(PREVIEW_CHARS + 5);
        let preview = preview_text(&long);
        assert!(preview.ends_with("\n\n... (truncated)"));
        assert_eq!(
            preview.trim_end_matches("\n\n... (truncated)").chars().count(),
            PREVIEW_CHARS
        );
    }

    #[test]
    fn test_empty_form_defaults() {
        let params = HomePageParams::new(FormatOptions::default(), 50);
        let html = render_home_page(&params).into_string();

        assert!(html.contains(r#"action="/extract""#));
        assert!(html.contains(r#"name="url""#));
        assert!(html.contains(r#"value="10""#));
        assert!(html.contains(r#"max="50""#));
        assert!(!html.contains(r#"id="result""#));
        assert!(!html.contains(r#"class="error""#));
    }

    #[test]
    fn test_error_is_shown_with_echoed_url() {
        let params = HomePageParams::new(FormatOptions::default(), 50)
            .url("not a url")
            .error("Please paste a valid Reddit post URL.");
        let html = render_home_page(&params).into_string();

        assert!(html.contains("Please paste a valid Reddit post URL."));
        assert!(html.contains(r#"value="not a url""#));
    }

    #[test]
    fn test_unchecked_options_echoed() {
        let options = FormatOptions {
            replies_per_branch: 3,
            include_scores: false,
            include_authors: true,
        };
        let html = render_home_page(&HomePageParams::new(options, 50).include_media(true))
            .into_string();
        assert!(html.contains(r#"value="3""#));
        assert!(!html.contains(r#"name="include_scores" value="on" checked"#));
        assert!(html.contains(r#"name="include_authors" value="on" checked"#));
        assert!(html.contains(r#"name="include_media" value="on" checked"#));
    }

    #[test]
    fn test_result_without_media() {
        let result = result(MediaOutcome::Unavailable);
        let params = HomePageParams::new(FormatOptions::default(), 50).result(Some(&result));
        let html = render_home_page(&params).into_string();

        assert!(html.contains("Extracted 3 main comment branches."));
        assert!(html.contains(r#"href="/download/report""#));
        assert!(html.contains(r#"download="reddit_main_branches_20240101_000000.txt""#));
        assert!(!html.contains("/download/media"));
        assert!(html.contains("No media available for this post."));
        assert!(html.contains("POST: Hello"));
    }

    #[test]
    fn test_result_with_media_archive() {
        let result = result(MediaOutcome::Ready(MediaArchive {
            bytes: vec![0],
            filename: "reddit_media_20240101_000000.zip".to_string(),
            entries: vec!["image_1.jpg".to_string()],
        }));
        let params = HomePageParams::new(FormatOptions::default(), 50).result(Some(&result));
        let html = render_home_page(&params).into_string();

        assert!(html.contains(r#"href="/download/media""#));
        assert!(html.contains(r#"download="reddit_media_20240101_000000.zip""#));
        assert!(!html.contains("No media available"));
    }
}

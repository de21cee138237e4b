//! Base page layout.

use maud::{html, Markup, PreEscaped, DOCTYPE};

/// Page styles. Inline so the app needs no static file directory.
const PAGE_STYLE: &str = r#"
:root { color-scheme: light dark; --accent: #ff4500; }
body { font-family: system-ui, sans-serif; margin: 0; line-height: 1.5; }
.container { max-width: 960px; margin: 0 auto; padding: 1rem 1.5rem; }
header.container { border-bottom: 1px solid #8884; }
.site-logo { font-size: 1.25rem; }
form .row { display: flex; gap: 1rem; flex-wrap: wrap; align-items: flex-end; }
form .row > div { display: flex; flex-direction: column; }
form .grow { flex: 3 1 20rem; }
input[type=url], input[type=number] { padding: .5rem; font-size: 1rem; }
small { opacity: .75; }
.btn { display: inline-block; padding: .6rem 1.2rem; border-radius: 6px; border: 1px solid var(--accent); text-decoration: none; cursor: pointer; font-size: 1rem; }
.btn-primary { background: var(--accent); color: #fff; }
.btn.outline { background: transparent; color: var(--accent); }
.btn-block { width: 100%; margin-top: 1rem; }
article { padding: .75rem 1rem; border-radius: 6px; margin: 1rem 0; border-left: 4px solid #888; }
article.success { border-color: #2e7d32; background: #2e7d3215; }
article.error { border-color: #c62828; background: #c6282815; }
article.warning { border-color: #ef6c00; background: #ef6c0015; }
article.info { border-color: #1565c0; background: #1565c015; }
.downloads { display: flex; gap: 1rem; flex-wrap: wrap; margin: 1rem 0; }
pre.report-preview { white-space: pre-wrap; word-break: break-word; max-height: 32rem; overflow: auto; padding: 1rem; border: 1px solid #8884; border-radius: 6px; }
"#;

/// Base page layout builder.
///
/// # Example
///
/// ```ignore
/// use maud::html;
/// use crate::components::layout::BaseLayout;
///
/// let content = html! { h1 { "Hello World" } };
/// let page = BaseLayout::new("My Page").render(content);
/// ```
#[derive(Debug, Clone)]
pub struct BaseLayout<'a> {
    title: &'a str,
    subtitle: Option<&'a str>,
}

impl<'a> BaseLayout<'a> {
    /// Create a new base layout with the given page title.
    #[must_use]
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            subtitle: None,
        }
    }

    /// Set a caption shown under the page heading.
    #[must_use]
    pub fn with_subtitle(mut self, subtitle: &'a str) -> Self {
        self.subtitle = Some(subtitle);
        self
    }

    /// Render the complete HTML page with the given content.
    ///
    /// The content will be placed inside the `<main class="container">` element.
    #[must_use]
    pub fn render(self, content: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    meta name="robots" content="noindex";
                    title { (self.title) " - Reddit Comment Extractor" }
                    link rel="icon" href="data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><text y='.9em' font-size='90'>🔍</text></svg>";
                    style { (PreEscaped(PAGE_STYLE)) }
                }
                body {
                    (Self::render_header())
                    main class="container" {
                        h1 { "🔍 " (self.title) }
                        @if let Some(subtitle) = self.subtitle {
                            p { small { (subtitle) } }
                        }
                        (content)
                    }
                    (Self::render_footer())
                }
            }
        }
    }

    fn render_header() -> Markup {
        html! {
            header class="container" {
                nav {
                    a href="/" {
                        strong class="site-logo" { "Reddit Comment Extractor" }
                    }
                }
            }
        }
    }

    fn render_footer() -> Markup {
        html! {
            footer class="container" {
                small { "Reports are kept for this browser session only." }
            }
        }
    }
}

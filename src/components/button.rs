//! Button component for the web UI.
//!
//! Renders as a `<button>` or, when an href is set, as an `<a>` styled like one.

use maud::{html, Markup, Render};

/// Button style variants matching CSS classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonVariant {
    #[default]
    Primary,
    Outline,
}

impl ButtonVariant {
    /// Returns the CSS class(es) for this variant.
    #[must_use]
    pub fn class(&self) -> &'static str {
        match self {
            Self::Primary => "btn btn-primary",
            Self::Outline => "btn outline",
        }
    }
}

/// A configurable button component.
///
/// ```ignore
/// use crate::components::button::Button;
///
/// let submit = Button::primary("Run Extraction").r#type("submit");
/// let download = Button::outline("Download report")
///     .href("/download/report")
///     .download("report.txt");
/// ```
#[derive(Debug, Clone)]
pub struct Button<'a> {
    pub label: &'a str,
    pub variant: ButtonVariant,
    /// Renders as `<a>` when present.
    pub href: Option<&'a str>,
    pub r#type: Option<&'a str>,
    pub class: Option<&'a str>,
    /// Suggested filename for download links.
    pub download: Option<&'a str>,
}

impl<'a> Button<'a> {
    #[must_use]
    pub fn new(label: &'a str, variant: ButtonVariant) -> Self {
        Self {
            label,
            variant,
            href: None,
            r#type: None,
            class: None,
            download: None,
        }
    }

    #[must_use]
    pub fn primary(label: &'a str) -> Self {
        Self::new(label, ButtonVariant::Primary)
    }

    #[must_use]
    pub fn outline(label: &'a str) -> Self {
        Self::new(label, ButtonVariant::Outline)
    }

    #[must_use]
    pub fn href(mut self, href: &'a str) -> Self {
        self.href = Some(href);
        self
    }

    #[must_use]
    pub fn r#type(mut self, r#type: &'a str) -> Self {
        self.r#type = Some(r#type);
        self
    }

    #[must_use]
    pub fn class(mut self, class: &'a str) -> Self {
        self.class = Some(class);
        self
    }

    #[must_use]
    pub fn download(mut self, filename: &'a str) -> Self {
        self.download = Some(filename);
        self
    }

    fn build_class(&self) -> String {
        let mut classes = self.variant.class().to_string();
        if let Some(extra) = self.class {
            classes.push(' ');
            classes.push_str(extra);
        }
        classes
    }
}

impl Render for Button<'_> {
    fn render(&self) -> Markup {
        let classes = self.build_class();

        if let Some(href) = self.href {
            html! {
                a class=(classes) href=(href) download=[self.download] {
                    (self.label)
                }
            }
        } else {
            html! {
                button class=(classes) type=(self.r#type.unwrap_or("button")) {
                    (self.label)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_button() {
        let html = Button::primary("Run Extraction")
            .r#type("submit")
            .class("btn-block")
            .render()
            .into_string();
        assert_eq!(
            html,
            r#"<button class="btn btn-primary btn-block" type="submit">Run Extraction</button>"#
        );
    }

    #[test]
    fn test_download_link() {
        let html = Button::outline("Download")
            .href("/download/report")
            .download("report.txt")
            .render()
            .into_string();
        assert!(html.starts_with("<a "));
        assert!(html.contains(r#"href="/download/report""#));
        assert!(html.contains(r#"download="report.txt""#));
        assert!(html.contains(r#"class="btn outline""#));
    }
}

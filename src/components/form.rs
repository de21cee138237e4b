//! Form components for maud templates.

use maud::{html, Markup, Render};

/// A form container element.
#[derive(Debug)]
pub struct Form<'a> {
    pub action: &'a str,
    /// HTTP method ("get" or "post")
    pub method: &'a str,
    pub content: Markup,
    pub class: Option<&'a str>,
    pub id: Option<&'a str>,
}

impl<'a> Form<'a> {
    #[must_use]
    pub fn new(action: &'a str, method: &'a str, content: Markup) -> Self {
        Self {
            action,
            method,
            content,
            class: None,
            id: None,
        }
    }

    /// Create a POST form.
    #[must_use]
    pub fn post(action: &'a str, content: Markup) -> Self {
        Self::new(action, "post", content)
    }

    #[must_use]
    pub fn class(mut self, class: &'a str) -> Self {
        self.class = Some(class);
        self
    }

    #[must_use]
    pub fn id(mut self, id: &'a str) -> Self {
        self.id = Some(id);
        self
    }
}

impl Render for Form<'_> {
    fn render(&self) -> Markup {
        html! {
            form action=(self.action) method=(self.method) class=[self.class] id=[self.id] {
                (self.content)
            }
        }
    }
}

/// An `<input>` element.
#[derive(Debug, Clone)]
pub struct Input<'a> {
    pub input_type: &'a str,
    pub name: &'a str,
    pub id: Option<&'a str>,
    pub value: Option<String>,
    pub placeholder: Option<&'a str>,
    pub required: bool,
    pub min: Option<String>,
    pub max: Option<String>,
}

impl<'a> Input<'a> {
    #[must_use]
    pub fn new(input_type: &'a str, name: &'a str) -> Self {
        Self {
            input_type,
            name,
            id: None,
            value: None,
            placeholder: None,
            required: false,
            min: None,
            max: None,
        }
    }

    #[must_use]
    pub fn url(name: &'a str) -> Self {
        Self::new("url", name)
    }

    #[must_use]
    pub fn number(name: &'a str) -> Self {
        Self::new("number", name)
    }

    #[must_use]
    pub fn id(mut self, id: &'a str) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl ToString) -> Self {
        self.value = Some(value.to_string());
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the inclusive numeric range accepted by the browser.
    #[must_use]
    pub fn range(mut self, min: impl ToString, max: impl ToString) -> Self {
        self.min = Some(min.to_string());
        self.max = Some(max.to_string());
        self
    }
}

impl Render for Input<'_> {
    fn render(&self) -> Markup {
        html! {
            input
                type=(self.input_type)
                name=(self.name)
                id=[self.id]
                value=[self.value.as_deref()]
                placeholder=[self.placeholder]
                min=[self.min.as_deref()]
                max=[self.max.as_deref()]
                required[self.required];
        }
    }
}

/// A labelled checkbox. Submits `value="on"` when checked.
#[derive(Debug, Clone)]
pub struct Checkbox<'a> {
    pub name: &'a str,
    pub label: &'a str,
    pub checked: bool,
}

impl<'a> Checkbox<'a> {
    #[must_use]
    pub fn new(name: &'a str, label: &'a str) -> Self {
        Self {
            name,
            label,
            checked: false,
        }
    }

    #[must_use]
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }
}

impl Render for Checkbox<'_> {
    fn render(&self) -> Markup {
        html! {
            label {
                input type="checkbox" name=(self.name) value="on" checked[self.checked];
                " " (self.label)
            }
        }
    }
}

/// A label, control and optional help text grouped together.
#[derive(Debug)]
pub struct FormGroup<'a> {
    pub label: Option<&'a str>,
    pub label_for: Option<&'a str>,
    pub control: Markup,
    pub help: Option<FormHelp<'a>>,
    pub class: Option<&'a str>,
}

impl<'a> FormGroup<'a> {
    #[must_use]
    pub fn new(control: Markup) -> Self {
        Self {
            label: None,
            label_for: None,
            control,
            help: None,
            class: None,
        }
    }

    #[must_use]
    pub fn label(mut self, label: &'a str, label_for: &'a str) -> Self {
        self.label = Some(label);
        self.label_for = Some(label_for);
        self
    }

    #[must_use]
    pub fn help(mut self, text: &'a str) -> Self {
        self.help = Some(FormHelp::new(text));
        self
    }

    #[must_use]
    pub fn class(mut self, class: &'a str) -> Self {
        self.class = Some(class);
        self
    }
}

impl Render for FormGroup<'_> {
    fn render(&self) -> Markup {
        html! {
            div class=[self.class] {
                @if let Some(label) = self.label {
                    label for=[self.label_for] { (label) }
                }
                (self.control)
                @if let Some(help) = &self.help {
                    (help)
                }
            }
        }
    }
}

/// Small help text shown under a form control.
#[derive(Debug, Clone)]
pub struct FormHelp<'a> {
    pub text: &'a str,
}

impl<'a> FormHelp<'a> {
    #[must_use]
    pub const fn new(text: &'a str) -> Self {
        Self { text }
    }
}

impl Render for FormHelp<'_> {
    fn render(&self) -> Markup {
        html! {
            small { (self.text) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_form() {
        let html = Form::post("/extract", html! { "x" })
            .id("extract-form")
            .render()
            .into_string();
        assert_eq!(
            html,
            r#"<form action="/extract" method="post" id="extract-form">x</form>"#
        );
    }

    #[test]
    fn test_url_input() {
        let html = Input::url("post_url")
            .id("post_url")
            .placeholder("https://www.reddit.com/r/...")
            .required()
            .render()
            .into_string();
        assert!(html.contains(r#"type="url""#));
        assert!(html.contains(r#"name="post_url""#));
        assert!(html.contains(r#"placeholder="https://www.reddit.com/r/...""#));
        assert!(html.contains("required"));
        assert!(!html.contains("value="));
    }

    #[test]
    fn test_number_input_range() {
        let html = Input::number("replies_per_branch")
            .value(10)
            .range(0, 50)
            .render()
            .into_string();
        assert!(html.contains(r#"value="10""#));
        assert!(html.contains(r#"min="0""#));
        assert!(html.contains(r#"max="50""#));
    }

    #[test]
    fn test_checkbox_states() {
        let on = Checkbox::new("include_scores", "Include scores")
            .checked(true)
            .render()
            .into_string();
        assert!(on.contains("checked"));
        assert!(on.contains("Include scores"));

        let off = Checkbox::new("include_media", "Download media")
            .render()
            .into_string();
        assert!(!off.contains("checked"));
    }

    #[test]
    fn test_form_group() {
        let html = FormGroup::new(html! { input; })
            .label("Replies per branch", "replies")
            .help("0 to 50")
            .class("grow")
            .render()
            .into_string();
        assert!(html.starts_with(r#"<div class="grow">"#));
        assert!(html.contains(r#"<label for="replies">Replies per branch</label>"#));
        assert!(html.contains("<small>0 to 50</small>"));
    }
}

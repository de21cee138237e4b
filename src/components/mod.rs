//! Maud HTML components for the web UI.
//!
//! - `layout`: Base page layout
//! - `button`: Buttons and download links
//! - `alert`: Alert messages
//! - `form`: Form elements and input components

pub mod alert;
pub mod button;
pub mod form;
pub mod layout;

pub use alert::{Alert, AlertVariant};
pub use button::{Button, ButtonVariant};
pub use form::{Checkbox, Form, FormGroup, FormHelp, Input};
pub use layout::BaseLayout;

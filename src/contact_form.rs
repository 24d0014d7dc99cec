use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use gloo_timers::callback::Timeout;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, FormData, HtmlFormElement};

use crate::config::FormConfig;
use crate::dom;

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("a required field is empty")]
    MissingField,
    #[error("email address is malformed")]
    InvalidEmail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

impl ContactSubmission {
    /// Phone is the only optional field.
    pub fn validate(&self) -> Result<(), FormError> {
        let required = [&self.name, &self.email, &self.subject, &self.message];
        if required.iter().any(|field| field.is_empty()) {
            return Err(FormError::MissingField);
        }
        if !is_valid_email(&self.email) {
            return Err(FormError::InvalidEmail);
        }
        Ok(())
    }

    fn from_form(form: &HtmlFormElement) -> Self {
        let Ok(data) = FormData::new_with_form(form) else {
            return Self::default();
        };
        let field = |name: &str| data.get(name).as_string().unwrap_or_default();
        Self {
            name: field("name"),
            email: field("email"),
            phone: field("phone"),
            subject: field("subject"),
            message: field("message"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Error,
}

impl FeedbackKind {
    pub fn class_name(self) -> &'static str {
        match self {
            FeedbackKind::Success => "form-feedback success",
            FeedbackKind::Error => "form-feedback error",
        }
    }
}

impl FormConfig {
    pub fn message_for(&self, error: FormError) -> &str {
        match error {
            FormError::MissingField => &self.missing_fields_message,
            FormError::InvalidEmail => &self.invalid_email_message,
        }
    }
}

pub struct ContactFormController {
    form: HtmlFormElement,
    feedback: Option<Element>,
    pending_reset: RefCell<Option<Timeout>>,
    config: FormConfig,
}

impl ContactFormController {
    /// `None` on pages without a contact form.
    pub fn new(document: &Document, config: FormConfig) -> Option<Rc<Self>> {
        let form = document
            .get_element_by_id("contactForm")?
            .dyn_into::<HtmlFormElement>()
            .ok()?;
        Some(Rc::new(Self {
            form,
            feedback: document.get_element_by_id("formFeedback"),
            pending_reset: RefCell::new(None),
            config,
        }))
    }

    pub fn install(self: &Rc<Self>) -> EventListener {
        let controller = Rc::clone(self);
        EventListener::new_with_options(
            &self.form,
            "submit",
            EventListenerOptions::enable_prevent_default(),
            move |event: &Event| {
                event.prevent_default();
                controller.submit();
            },
        )
    }

    fn submit(&self) {
        let submission = ContactSubmission::from_form(&self.form);
        if let Err(error) = submission.validate() {
            debug!("Contact form rejected: {}", error);
            show_feedback(self.feedback.as_ref(), FeedbackKind::Error, self.config.message_for(error));
            return;
        }

        show_feedback(self.feedback.as_ref(), FeedbackKind::Success, &self.config.success_message);
        info!("Contact form submitted by {} <{}>", submission.name, submission.email);
        debug!("{:?}", submission);

        let form = self.form.clone();
        let feedback = self.feedback.clone();
        // Replacing the handle cancels a reset still pending from an earlier submit.
        *self.pending_reset.borrow_mut() = Some(Timeout::new(self.config.reset_delay_ms, move || {
            form.reset();
            hide_feedback(feedback.as_ref());
        }));
    }
}

fn show_feedback(feedback: Option<&Element>, kind: FeedbackKind, message: &str) {
    if let Some(feedback) = feedback {
        feedback.set_class_name(kind.class_name());
        feedback.set_text_content(Some(message));
        dom::set_style(feedback, "display", "block");
    }
}

fn hide_feedback(feedback: Option<&Element>) {
    if let Some(feedback) = feedback {
        dom::set_style(feedback, "display", "none");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ContactSubmission {
        ContactSubmission {
            name: "Ayşe Yılmaz".to_string(),
            email: "ayse@example.com".to_string(),
            phone: String::new(),
            subject: "Teklif".to_string(),
            message: "Merhaba".to_string(),
        }
    }

    #[test]
    fn complete_submission_passes_without_phone() {
        assert_eq!(filled().validate(), Ok(()));
    }

    #[test]
    fn any_empty_required_field_fails() {
        let blanks: [fn(&mut ContactSubmission); 4] = [
            |s| s.name.clear(),
            |s| s.email.clear(),
            |s| s.subject.clear(),
            |s| s.message.clear(),
        ];
        for blank in blanks {
            let mut submission = filled();
            blank(&mut submission);
            assert_eq!(submission.validate(), Err(FormError::MissingField));
        }
    }

    #[test]
    fn missing_field_wins_over_bad_email() {
        let submission = ContactSubmission {
            email: "not-an-email".to_string(),
            message: String::new(),
            ..filled()
        };
        assert_eq!(submission.validate(), Err(FormError::MissingField));
    }

    #[test]
    fn email_shape() {
        assert!(!is_valid_email("a@b"));
        assert!(is_valid_email("a@b.com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email("@b.com"));
        assert!(is_valid_email("first.last@sub.example.com.tr"));
    }

    #[test]
    fn malformed_email_is_rejected() {
        let submission = ContactSubmission {
            email: "a@b".to_string(),
            ..filled()
        };
        assert_eq!(submission.validate(), Err(FormError::InvalidEmail));
    }

    #[test]
    fn errors_map_to_localized_messages() {
        let config = FormConfig::default();
        assert_eq!(config.message_for(FormError::MissingField), config.missing_fields_message);
        assert_eq!(config.message_for(FormError::InvalidEmail), config.invalid_email_message);
        assert_eq!(FeedbackKind::Error.class_name(), "form-feedback error");
    }
}

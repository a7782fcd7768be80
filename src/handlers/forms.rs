//! Registration form parsing and validation
//!
//! Mirrors the checks enforced by the database so users see friendly inline
//! messages instead of constraint violations: grade range, Bangladesh mobile
//! format, email shape, and the terms checkbox.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::registration::{GRADE_MAX, GRADE_MIN};
use crate::services::registration::NewRegistration;

/// Raw registration form fields as posted by the browser
///
/// Serialized back into the template context when the form re-renders with
/// validation errors, so submitted values survive the round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub student_name: String,
    pub grade: String,
    /// Selected school id
    pub school: String,
    pub contact_number: String,
    pub email: String,
    /// Checkbox: present ("on") only when checked
    #[serde(default)]
    pub terms_agreed: Option<String>,
}

/// A single field validation failure, rendered inline next to the field
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\+8801|01)[3-9]\d{8}$").expect("valid phone regex"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

/// Validate the posted form, producing either a clean registration request or
/// the full list of field errors
pub fn validate_registration_form(
    form: &RegistrationForm,
) -> Result<NewRegistration, Vec<FieldError>> {
    let mut errors = Vec::new();

    let student_name = form.student_name.trim().to_string();
    if student_name.is_empty() {
        errors.push(FieldError::new("student_name", "Student name is required."));
    } else if student_name.len() > 200 {
        errors.push(FieldError::new(
            "student_name",
            "Student name must be at most 200 characters.",
        ));
    }

    let grade = match form.grade.trim().parse::<i32>() {
        Ok(grade) if (GRADE_MIN..=GRADE_MAX).contains(&grade) => Some(grade),
        Ok(_) => {
            errors.push(FieldError::new(
                "grade",
                format!("Grade must be between {} and {}.", GRADE_MIN, GRADE_MAX),
            ));
            None
        }
        Err(_) => {
            errors.push(FieldError::new("grade", "Invalid grade value."));
            None
        }
    };

    let school_id = match form.school.trim().parse::<i64>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            errors.push(FieldError::new("school", "Please select your school."));
            None
        }
    };

    let contact_number = form.contact_number.trim().to_string();
    if !phone_regex().is_match(&contact_number) {
        errors.push(FieldError::new(
            "contact_number",
            "Phone number must be a valid Bangladesh number (e.g., 01712345678 or +8801712345678).",
        ));
    }

    let email = form.email.trim().to_lowercase();
    if !email_regex().is_match(&email) {
        errors.push(FieldError::new("email", "Enter a valid email address."));
    }

    if form.terms_agreed.is_none() {
        errors.push(FieldError::new(
            "terms_agreed",
            "You must agree to the terms and conditions.",
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewRegistration {
        student_name,
        grade: grade.expect("validated"),
        school_id: school_id.expect("validated"),
        contact_number,
        email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> RegistrationForm {
        RegistrationForm {
            student_name: "Ayesha Rahman".to_string(),
            grade: "9".to_string(),
            school: "1".to_string(),
            contact_number: "01712345678".to_string(),
            email: "Ayesha@Example.com".to_string(),
            terms_agreed: Some("on".to_string()),
        }
    }

    fn errors_for(form: &RegistrationForm) -> Vec<&'static str> {
        match validate_registration_form(form) {
            Ok(_) => vec![],
            Err(errors) => errors.into_iter().map(|e| e.field).collect(),
        }
    }

    #[test]
    fn test_valid_form_passes() {
        let validated = validate_registration_form(&valid_form()).unwrap();
        assert_eq!(validated.grade, 9);
        assert_eq!(validated.school_id, 1);
        // Email is normalized to lowercase
        assert_eq!(validated.email, "ayesha@example.com");
    }

    #[test]
    fn test_grade_bounds() {
        for grade in ["2", "7", "12"] {
            let mut form = valid_form();
            form.grade = grade.to_string();
            assert!(validate_registration_form(&form).is_ok(), "grade {}", grade);
        }
        for grade in ["1", "13", "0", "-3", "abc", ""] {
            let mut form = valid_form();
            form.grade = grade.to_string();
            assert!(errors_for(&form).contains(&"grade"), "grade {}", grade);
        }
    }

    #[test]
    fn test_phone_number_format() {
        for phone in ["01712345678", "+8801712345678", "01912345678"] {
            let mut form = valid_form();
            form.contact_number = phone.to_string();
            assert!(validate_registration_form(&form).is_ok(), "phone {}", phone);
        }
        for phone in [
            "0171234567",     // too short
            "017123456789",   // too long
            "01212345678",    // invalid operator digit
            "+8802712345678", // invalid prefix
            "8801712345678",  // missing plus
            "phone",
        ] {
            let mut form = valid_form();
            form.contact_number = phone.to_string();
            assert!(errors_for(&form).contains(&"contact_number"), "phone {}", phone);
        }
    }

    #[test]
    fn test_malformed_email_rejected() {
        for email in ["plainaddress", "missing@tld", "spaces in@example.com", "@example.com"] {
            let mut form = valid_form();
            form.email = email.to_string();
            assert!(errors_for(&form).contains(&"email"), "email {}", email);
        }
    }

    #[test]
    fn test_terms_must_be_agreed() {
        let mut form = valid_form();
        form.terms_agreed = None;
        assert!(errors_for(&form).contains(&"terms_agreed"));
    }

    #[test]
    fn test_form_round_trips_through_template_context() {
        // Rejected submissions go back into the Tera context for repopulation
        let mut context = tera::Context::new();
        context.insert("form", &valid_form());

        let value = context.into_json();
        assert_eq!(value["form"]["student_name"], "Ayesha Rahman");
        assert_eq!(value["form"]["grade"], "9");
        assert_eq!(value["form"]["terms_agreed"], "on");
    }

    #[test]
    fn test_multiple_errors_reported_together() {
        let form = RegistrationForm {
            student_name: "".to_string(),
            grade: "1".to_string(),
            school: "".to_string(),
            contact_number: "123".to_string(),
            email: "nope".to_string(),
            terms_agreed: None,
        };
        let errors = errors_for(&form);
        assert_eq!(errors.len(), 6);
    }
}

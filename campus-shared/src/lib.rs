pub mod collection;
pub mod interaction;
pub mod model;
pub mod path;

pub const PDF_MIME: &str = "application/pdf";
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;
pub const PAGE_SIZE: usize = 6;
pub const LIKED_COMMENTS_KEY: &str = "likedComments";
pub const CURRENT_USER_KEY: &str = "currentUser";

pub mod valid {
    use tracing::trace;

    pub mod post {
        use super::Validator;
        use tracing::trace;

        pub fn proccess_post_content<S: AsRef<str>>(content: S) -> Result<String, String> {
            let mut errors = String::new();
            let input = content.as_ref().trim().to_string();
            if input.is_smaller_than(1) {
                errors += "post must not be empty\n";
            }
            if input.is_bigger_than(10240) {
                errors += "post must be shorter than 10241 characters length\n";
            }

            if errors.is_empty() {
                Ok(input)
            } else {
                let _ = errors.pop();
                trace!("errors {errors}");
                Err(errors)
            }
        }

        pub fn proccess_comment<S: AsRef<str>>(content: S) -> Result<String, String> {
            let mut errors = String::new();
            let input = content.as_ref().trim().to_string();
            if input.is_smaller_than(1) {
                errors += "comment must not be empty\n";
            }
            if input.is_bigger_than(2000) {
                errors += "comment must be shorter than 2001 characters length\n";
            }

            if errors.is_empty() {
                Ok(input)
            } else {
                let _ = errors.pop();
                trace!("errors {errors}");
                Err(errors)
            }
        }

        #[cfg(test)]
        mod post_tests {
            use super::{proccess_comment, proccess_post_content};
            use test_log::test;

            #[test]
            fn test_proccess_comment() {
                assert!(proccess_comment("").is_err());
                assert!(proccess_comment("   \n\t ").is_err());
                assert_eq!(proccess_comment("  nice  ").unwrap(), "nice");
                assert!(proccess_comment("a".repeat(2001)).is_err());
            }

            #[test]
            fn test_proccess_post_content() {
                assert!(proccess_post_content(" ").is_err());
                assert!(proccess_post_content("<p>hey</p>").is_ok());
            }
        }
    }

    pub mod upload {
        use super::Validator;
        use crate::{MAX_UPLOAD_BYTES, PDF_MIME};
        use tracing::trace;

        #[derive(Debug, Clone, PartialEq)]
        pub struct UploadFile {
            pub name: String,
            pub mime: String,
            pub size: u64,
        }

        pub fn proccess_upload<S: AsRef<str>>(
            name: S,
            mime: S,
            size: u64,
        ) -> Result<UploadFile, String> {
            let mut errors = String::new();
            let name = name.as_ref().trim().to_string();
            let mime = mime.as_ref().trim().to_string();
            if name.is_smaller_than(1) {
                errors += "please select a file to upload\n";
            }
            if mime != PDF_MIME {
                errors += "only PDF files are allowed\n";
            }
            if size == 0 {
                errors += "file is empty\n";
            }
            if size > MAX_UPLOAD_BYTES {
                errors += "file size exceeds 50MB\n";
            }

            if errors.is_empty() {
                Ok(UploadFile { name, mime, size })
            } else {
                let _ = errors.pop();
                trace!("errors {errors}");
                Err(errors)
            }
        }

        pub fn proccess_note_title<S: AsRef<str>>(title: S) -> Result<String, String> {
            let mut errors = String::new();
            let input = title.as_ref().trim().to_string();
            if input.is_smaller_than(1) {
                errors += "title must be at least 1 characters length\n";
            }
            if input.is_bigger_than(120) {
                errors += "title must be shorter than 121 characters length\n";
            }

            if errors.is_empty() {
                Ok(input)
            } else {
                let _ = errors.pop();
                trace!("errors {errors}");
                Err(errors)
            }
        }

    }

    pub mod form {
        use super::Validator;
        use crate::model::{OpportunityForm, SeniorForm};
        use tracing::trace;

        pub fn proccess_senior(form: SeniorForm) -> Result<SeniorForm, String> {
            let mut errors = String::new();
            let form = SeniorForm {
                name: form.name.trim().to_string(),
                branch: form.branch.trim().to_string(),
                year: form.year.trim().to_string(),
                domain: form.domain.trim().to_string(),
                whatsapp: form.whatsapp.trim().to_string(),
                telegram: form
                    .telegram
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty()),
                college: form.college.trim().to_string(),
            };
            if form.name.is_smaller_than(1) {
                errors += "name is required\n";
            }
            if form.branch.is_smaller_than(1) {
                errors += "branch is required\n";
            }
            if form.year.is_smaller_than(1) {
                errors += "year is required\n";
            }
            if form.domain.is_smaller_than(1) {
                errors += "expertise is required\n";
            }
            if !form.whatsapp.is_phone_number() {
                errors += "whatsapp must be a phone number\n";
            }
            if form
                .telegram
                .as_ref()
                .map(|v| !v.is_phone_number())
                .unwrap_or_default()
            {
                errors += "telegram must be a phone number\n";
            }
            if form.college.is_smaller_than(1) {
                errors += "college is required\n";
            }

            if errors.is_empty() {
                Ok(form)
            } else {
                let _ = errors.pop();
                trace!("errors {errors}");
                Err(errors)
            }
        }

        pub fn proccess_opportunity(form: OpportunityForm) -> Result<OpportunityForm, String> {
            let mut errors = String::new();
            let form = OpportunityForm {
                name: form.name.trim().to_string(),
                description: form.description.trim().to_string(),
                whatsapp: form.whatsapp.trim().to_string(),
                email: form.email.trim().to_string(),
                college: form.college,
            };
            if form.name.is_smaller_than(1) {
                errors += "name is required\n";
            }
            if form.description.is_smaller_than(1) {
                errors += "description is required\n";
            }
            if !form.whatsapp.is_phone_number() {
                errors += "whatsapp must be a phone number\n";
            }
            if !form.email.is_email() {
                errors += "invalid email\n";
            }

            if errors.is_empty() {
                Ok(form)
            } else {
                let _ = errors.pop();
                trace!("errors {errors}");
                Err(errors)
            }
        }

        #[cfg(test)]
        mod form_tests {
            use super::{proccess_opportunity, proccess_senior};
            use crate::model::{OpportunityForm, SeniorForm};
            use test_log::test;

            fn senior() -> SeniorForm {
                SeniorForm {
                    name: " Mohd Rafey ".into(),
                    branch: "CSE".into(),
                    year: "4".into(),
                    domain: "web".into(),
                    whatsapp: "+91 98765 43210".into(),
                    telegram: Some(" ".into()),
                    college: "c1".into(),
                }
            }

            #[test]
            fn test_proccess_senior() {
                let form = proccess_senior(senior()).unwrap();
                assert_eq!(form.name, "Mohd Rafey");
                assert_eq!(form.telegram, None);

                let bad_whatsapp = SeniorForm {
                    whatsapp: "call me".into(),
                    ..senior()
                };
                assert!(proccess_senior(bad_whatsapp).is_err());
                let no_college = SeniorForm {
                    college: "".into(),
                    ..senior()
                };
                assert!(proccess_senior(no_college).is_err());
                let bad_telegram = SeniorForm {
                    telegram: Some("abc".into()),
                    ..senior()
                };
                assert!(proccess_senior(bad_telegram).is_err());
            }

            #[test]
            fn test_proccess_opportunity() {
                let form = OpportunityForm {
                    name: "Frontend intern".into(),
                    description: "React".into(),
                    whatsapp: "9876543210".into(),
                    email: "hey@college.edu".into(),
                    college: Some("c1".into()),
                };
                assert!(proccess_opportunity(form.clone()).is_ok());
                let bad_email = OpportunityForm {
                    email: "nope".into(),
                    ..form.clone()
                };
                assert!(proccess_opportunity(bad_email).is_err());
                let blank_name = OpportunityForm {
                    name: " ".into(),
                    ..form
                };
                assert!(proccess_opportunity(blank_name).is_err());
            }
        }
    }

    pub trait Validator {
        fn is_smaller_than(&self, size: usize) -> bool;
        fn is_bigger_than(&self, size: usize) -> bool;
        fn is_phone_number(&self) -> bool;
        fn is_email(&self) -> bool;
    }

    impl<S: AsRef<str>> Validator for S {
        fn is_bigger_than(&self, size: usize) -> bool {
            self.as_ref().chars().count() > size
        }
        fn is_smaller_than(&self, size: usize) -> bool {
            self.as_ref().chars().count() < size
        }
        fn is_phone_number(&self) -> bool {
            let input = self.as_ref();
            let digits = input.chars().filter(|c| c.is_ascii_digit()).count();
            let valid_chars = input
                .chars()
                .enumerate()
                .all(|(i, c)| c.is_ascii_digit() || c == ' ' || c == '-' || (i == 0 && c == '+'));
            if !valid_chars {
                trace!("invalid phone chars {input}");
                return false;
            }
            (7..=15).contains(&digits)
        }
        fn is_email(&self) -> bool {
            email_address::EmailAddress::is_valid(self.as_ref())
        }
    }

    #[cfg(test)]
    mod valid_tests {
        use super::Validator;
        use test_log::test;

        #[test]
        fn test_validator() {
            assert!(!"input".is_smaller_than(5));
            assert!("input".is_smaller_than(6));
            assert!(!"input".is_bigger_than(5));
            assert!("input".is_bigger_than(4));
            assert!("ééé".is_smaller_than(4));
            assert!("9876543210".is_phone_number());
            assert!("+91 98765-43210".is_phone_number());
            assert!(!"98+76543210".is_phone_number());
            assert!(!"123".is_phone_number());
            assert!("hey@hey.com".is_email());
            assert!(!"heyhey.com".is_email());
        }
    }
}

use garde::Validate;
use std::path::Path;

/// Form field names the n8n form trigger is configured with.
pub const DESCRIPTION_FIELD: &str = "Descripcion de producto";
pub const IMAGE_FIELD: &str = "Imagen";

/// Largest image accepted before anything is sent.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// An image picked by the user, with its detected MIME type.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::new(file_name, bytes))
    }

    /// MIME type sniffed from the content, if it is a recognised image.
    pub fn mime_type(&self) -> Option<&'static str> {
        image::guess_format(&self.bytes)
            .ok()
            .map(|format| format.to_mime_type())
            .filter(|mime| mime.starts_with("image/"))
    }
}

/// What the user filled in, before validation.
#[derive(Debug, Clone, Validate)]
pub struct SubmissionDraft {
    #[garde(custom(non_blank))]
    description: String,

    #[garde(custom(valid_image))]
    image: Option<ImageAttachment>,
}

fn non_blank(value: &str, _ctx: &()) -> garde::Result {
    if value.is_empty() {
        return Err(garde::Error::new("please enter a description"));
    }
    Ok(())
}

fn valid_image(value: &Option<ImageAttachment>, _ctx: &()) -> garde::Result {
    let Some(image) = value else {
        return Err(garde::Error::new("please select an image"));
    };
    if image.mime_type().is_none() {
        return Err(garde::Error::new("please select an image file"));
    }
    if image.bytes.len() > MAX_IMAGE_BYTES {
        return Err(garde::Error::new("image must be less than 10MB"));
    }
    Ok(())
}

impl SubmissionDraft {
    /// The description is trimmed; surrounding whitespace never counts as text.
    pub fn new(description: &str, image: Option<ImageAttachment>) -> Self {
        Self {
            description: description.trim().to_string(),
            image,
        }
    }

    /// Validate and turn the draft into something that can be sent.
    pub fn into_submission(self) -> Result<Submission, ValidationError> {
        self.validate().map_err(|report| ValidationError(report.to_string()))?;

        let image = self
            .image
            .ok_or_else(|| ValidationError("image: please select an image".to_string()))?;
        let mime_type = image
            .mime_type()
            .ok_or_else(|| ValidationError("image: please select an image file".to_string()))?;

        Ok(Submission {
            description: self.description,
            image,
            mime_type,
        })
    }
}

/// A validated submission, ready for the relay.
#[derive(Debug, Clone)]
pub struct Submission {
    pub description: String,
    pub image: ImageAttachment,
    pub mime_type: &'static str,
}

impl Submission {
    /// Multipart form in the shape the workflow's form trigger expects.
    pub fn to_form(&self) -> Result<reqwest::multipart::Form, reqwest::Error> {
        let part = reqwest::multipart::Part::bytes(self.image.bytes.clone())
            .file_name(self.image.file_name.clone())
            .mime_str(self.mime_type)?;

        Ok(reqwest::multipart::Form::new()
            .text(DESCRIPTION_FIELD, self.description.clone())
            .part(IMAGE_FIELD, part))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid submission: {0}")]
pub struct ValidationError(pub String);

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Smallest valid PNG (1x1).
    pub(crate) const PNG_1X1: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0xF8,
        0xCF, 0xC0, 0x00, 0x00, 0x03, 0x01, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0xB0, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    pub(crate) fn png() -> ImageAttachment {
        ImageAttachment::new("shoe.png", PNG_1X1.to_vec())
    }

    #[test]
    fn test_valid_submission() {
        let submission = SubmissionDraft::new("  Red sneakers  ", Some(png()))
            .into_submission()
            .unwrap();
        assert_eq!(submission.description, "Red sneakers");
        assert_eq!(submission.mime_type, "image/png");
    }

    #[test]
    fn test_blank_description_rejected() {
        let err = SubmissionDraft::new("   \n", Some(png())).into_submission().unwrap_err();
        assert!(err.0.contains("description"), "{err}");
    }

    #[test]
    fn test_missing_image_rejected() {
        let err = SubmissionDraft::new("text", None).into_submission().unwrap_err();
        assert!(err.0.contains("select an image"), "{err}");
    }

    #[test]
    fn test_non_image_rejected() {
        let doc = ImageAttachment::new("notes.txt", b"just some text".to_vec());
        let err = SubmissionDraft::new("text", Some(doc)).into_submission().unwrap_err();
        assert!(err.0.contains("image file"), "{err}");
    }

    #[test]
    fn test_oversized_image_rejected() {
        let mut bytes = PNG_1X1.to_vec();
        bytes.resize(MAX_IMAGE_BYTES + 1, 0);
        let big = ImageAttachment::new("big.png", bytes);
        let err = SubmissionDraft::new("text", Some(big)).into_submission().unwrap_err();
        assert!(err.0.contains("10MB"), "{err}");
    }

    #[test]
    fn test_form_builds() {
        let submission = SubmissionDraft::new("desc", Some(png())).into_submission().unwrap();
        let form = submission.to_form().unwrap();
        assert!(form.boundary().len() > 10);
    }
}

use serde::{Deserialize, Serialize};

use crate::models::require_text;
use crate::store::{Record, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub author: String,
    pub quote: String,
}

impl Record for Testimonial {
    const LABEL: &'static str = "testimonial";

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("author", &self.author)?;
        require_text("quote", &self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_testimonial_needs_both_fields() {
        let valid = Testimonial {
            author: "Claire".to_string(),
            quote: "Très à l'écoute.".to_string(),
        };
        assert!(valid.validate().is_ok());

        let missing_quote = Testimonial {
            quote: " ".to_string(),
            ..valid
        };
        assert_eq!(missing_quote.validate().unwrap_err().field, "quote");
    }
}

//! Location profile model
//!
//! One `LocationProfile` record drives one service-area landing page. The
//! pages share a single template; everything that differs between, say, the
//! Manchester and Sheffield pages lives in these records, loaded from YAML
//! files in the configured locations directory.

use serde::{Deserialize, Serialize};

/// Data record for one service-area landing page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationProfile {
    /// URL slug, e.g. "manchester"
    pub slug: String,
    /// Display name, e.g. "Manchester"
    pub name: String,
    /// Region line, e.g. "Greater Manchester"
    pub region: String,
    /// Opening paragraph for the page
    pub intro: String,
    /// Services offered in this area
    #[serde(default)]
    pub services: Vec<String>,
    /// Industries served in this area
    #[serde(default)]
    pub industries: Vec<String>,
    /// Customer testimonials
    #[serde(default)]
    pub testimonials: Vec<Testimonial>,
    /// Frequently asked questions
    #[serde(default)]
    pub faqs: Vec<Faq>,
}

/// A customer testimonial
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Testimonial {
    pub quote: String,
    pub author: String,
}

/// A question/answer pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_parses_from_yaml_with_optional_sections() {
        let yaml = r#"
slug: sheffield
name: Sheffield
region: South Yorkshire
intro: Shot blasting for Sheffield's steel heritage.
services:
  - Steel fabrication blasting
  - Brick cleaning
faqs:
  - question: Do you collect?
    answer: Yes, across South Yorkshire.
"#;
        let profile: LocationProfile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(profile.slug, "sheffield");
        assert_eq!(profile.services.len(), 2);
        assert_eq!(profile.faqs.len(), 1);
        assert!(profile.testimonials.is_empty());
        assert!(profile.industries.is_empty());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Returns true for inline `data:` image payloads (base64 screenshots,
/// uploads). These blow up the encoded size and are stripped before a
/// collection is written to the store.
pub fn is_inline_image(image: &str) -> bool {
    image.starts_with("data:")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prize {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// A case definition: a named container with a prize pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub prizes: Vec<Prize>,
}

impl CaseType {
    /// Copy with inline image payloads dropped. External URLs survive.
    pub fn without_inline_images(&self) -> Self {
        let mut stripped = self.clone();
        if stripped.image.as_deref().is_some_and(is_inline_image) {
            stripped.image = None;
        }
        for prize in &mut stripped.prizes {
            if prize.image.as_deref().is_some_and(is_inline_image) {
                prize.image = None;
            }
        }
        stripped
    }

    /// Re-attach images from `defaults` where they were stripped on a
    /// previous persist. Saved fields otherwise win over defaults.
    pub fn restore_images_from(&mut self, defaults: &CaseType) {
        if self.image.is_none() {
            self.image = defaults.image.clone();
        }
        for prize in &mut self.prizes {
            if prize.image.is_none() {
                if let Some(default_prize) = defaults.prizes.iter().find(|p| p.id == prize.id) {
                    prize.image = default_prize.image.clone();
                }
            }
        }
    }
}

/// A case instance owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCase {
    pub id: String,
    pub case_id: String,
    pub obtained_at: DateTime<Utc>,
    pub opened: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_case() -> CaseType {
        CaseType {
            id: "case1".to_string(),
            name: "Starter".to_string(),
            image: Some("data:image/png;base64,AAAA".to_string()),
            prizes: vec![
                Prize {
                    id: "p1".to_string(),
                    name: "Sticker".to_string(),
                    image: Some("https://cdn.example/p1.png".to_string()),
                },
                Prize {
                    id: "p2".to_string(),
                    name: "Mug".to_string(),
                    image: Some("data:image/png;base64,BBBB".to_string()),
                },
            ],
        }
    }

    #[test]
    fn test_strip_drops_only_inline_images() {
        let stripped = sample_case().without_inline_images();
        assert_eq!(stripped.image, None);
        assert_eq!(
            stripped.prizes[0].image.as_deref(),
            Some("https://cdn.example/p1.png")
        );
        assert_eq!(stripped.prizes[1].image, None);
    }

    #[test]
    fn test_restore_reattaches_stripped_images() {
        let defaults = sample_case();
        let mut loaded = defaults.without_inline_images();
        loaded.restore_images_from(&defaults);
        assert_eq!(loaded.image, defaults.image);
        assert_eq!(loaded.prizes[1].image, defaults.prizes[1].image);
    }
}

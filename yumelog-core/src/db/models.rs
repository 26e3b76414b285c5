//! Database models and field validation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::sanitize;
use crate::yomi;

/// Maximum dream title length, in characters
pub const TITLE_MAX_CHARS: usize = 15;
/// Maximum dream content length, in characters (counted after markup stripping)
pub const CONTENT_MAX_CHARS: usize = 10_000;

/// Emotion classification of a dream. Closed set; unknown labels are
/// rejected at the deserialization boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionColor {
    Peace,
    Chaos,
    Fear,
    Elation,
}

impl EmotionColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionColor::Peace => "peace",
            EmotionColor::Chaos => "chaos",
            EmotionColor::Fear => "fear",
            EmotionColor::Elation => "elation",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "peace" => Some(EmotionColor::Peace),
            "chaos" => Some(EmotionColor::Chaos),
            "fear" => Some(EmotionColor::Fear),
            "elation" => Some(EmotionColor::Elation),
            _ => None,
        }
    }
}

/// Tag category: a recurring person or a recurring place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagCategory {
    Person,
    Place,
}

impl TagCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagCategory::Person => "person",
            TagCategory::Place => "place",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "person" => Some(TagCategory::Person),
            "place" => Some(TagCategory::Place),
            _ => None,
        }
    }
}

/// Phonetic index bucket for a tag, derived from the first character of its
/// yomi. Ten syllabary rows plus alphanumeric and catch-all buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YomiIndex {
    #[serde(rename = "あ")]
    A,
    #[serde(rename = "か")]
    Ka,
    #[serde(rename = "さ")]
    Sa,
    #[serde(rename = "た")]
    Ta,
    #[serde(rename = "な")]
    Na,
    #[serde(rename = "は")]
    Ha,
    #[serde(rename = "ま")]
    Ma,
    #[serde(rename = "や")]
    Ya,
    #[serde(rename = "ら")]
    Ra,
    #[serde(rename = "わ")]
    Wa,
    #[serde(rename = "英数字")]
    Alnum,
    #[serde(rename = "他")]
    Other,
}

impl YomiIndex {
    /// All twelve buckets, in syllabary order
    pub const ALL: [YomiIndex; 12] = [
        YomiIndex::A,
        YomiIndex::Ka,
        YomiIndex::Sa,
        YomiIndex::Ta,
        YomiIndex::Na,
        YomiIndex::Ha,
        YomiIndex::Ma,
        YomiIndex::Ya,
        YomiIndex::Ra,
        YomiIndex::Wa,
        YomiIndex::Alnum,
        YomiIndex::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            YomiIndex::A => "あ",
            YomiIndex::Ka => "か",
            YomiIndex::Sa => "さ",
            YomiIndex::Ta => "た",
            YomiIndex::Na => "な",
            YomiIndex::Ha => "は",
            YomiIndex::Ma => "ま",
            YomiIndex::Ya => "や",
            YomiIndex::Ra => "ら",
            YomiIndex::Wa => "わ",
            YomiIndex::Alnum => "英数字",
            YomiIndex::Other => "他",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        YomiIndex::ALL.into_iter().find(|idx| idx.label() == label)
    }
}

/// Account record. Password and credential storage belong to the auth layer,
/// not this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub guid: Uuid,
    pub email: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, username: String) -> Self {
        Self {
            guid: Uuid::new_v4(),
            email,
            username,
            created_at: Utc::now(),
        }
    }
}

/// One recorded dream entry, owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dream {
    pub guid: Uuid,
    pub user_id: Uuid,
    pub title: String,
    /// Plain text only; markup is stripped before persistence
    pub content: String,
    pub emotion_color: EmotionColor,
    pub lucid_dream_flag: bool,
    pub dreamed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Dream {
    /// Build a new dream from an already-sanitized draft
    pub fn new(user_id: Uuid, draft: DreamDraft) -> Self {
        Self {
            guid: Uuid::new_v4(),
            user_id,
            title: draft.title,
            content: draft.content,
            emotion_color: draft.emotion_color,
            lucid_dream_flag: draft.lucid_dream_flag,
            dreamed_at: draft.dreamed_at,
            created_at: Utc::now(),
        }
    }

    /// Overwrite the mutable fields from an already-sanitized draft
    pub fn apply(&mut self, draft: DreamDraft) {
        self.title = draft.title;
        self.content = draft.content;
        self.emotion_color = draft.emotion_color;
        self.lucid_dream_flag = draft.lucid_dream_flag;
        self.dreamed_at = draft.dreamed_at;
    }
}

/// Incoming dream fields for create/update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DreamDraft {
    pub title: String,
    pub content: String,
    pub emotion_color: EmotionColor,
    #[serde(default)]
    pub lucid_dream_flag: bool,
    pub dreamed_at: DateTime<Utc>,
}

impl DreamDraft {
    /// Strip markup from the content, then check every declared constraint.
    /// Returns the sanitized draft, or the full list of violated fields.
    pub fn sanitized(mut self) -> Result<Self> {
        self.content = sanitize::strip_markup(&self.content);

        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("Title can't be blank".to_string());
        } else if self.title.chars().count() > TITLE_MAX_CHARS {
            errors.push(format!(
                "Title is too long (maximum is {TITLE_MAX_CHARS} characters)"
            ));
        }
        if self.content.trim().is_empty() {
            errors.push("Content can't be blank".to_string());
        } else if self.content.chars().count() > CONTENT_MAX_CHARS {
            errors.push(format!(
                "Content is too long (maximum is {CONTENT_MAX_CHARS} characters)"
            ));
        }

        if errors.is_empty() {
            Ok(self)
        } else {
            Err(Error::Validation(errors))
        }
    }
}

/// Recurring person/place tag, owned by exactly one user.
/// Name is unique per user; two users may own identically named tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub guid: Uuid,
    pub user_id: Uuid,
    pub name: String,
    /// Phonetic (hiragana) reading of the name
    pub yomi: String,
    /// Always derived from `yomi`; never set by a caller
    pub yomi_index: YomiIndex,
    pub category: TagCategory,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// The only construction path for a tag. Computes `yomi_index` itself,
    /// so a tag with an index inconsistent with its yomi cannot exist.
    pub fn new(user_id: Uuid, name: String, yomi: String, category: TagCategory) -> Self {
        let yomi_index = yomi::classify(&yomi);
        Self {
            guid: Uuid::new_v4(),
            user_id,
            name,
            yomi,
            yomi_index,
            category,
            created_at: Utc::now(),
        }
    }
}

/// Raw tag fields supplied alongside a dream write
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagDescriptor {
    pub name: String,
    pub yomi: String,
    pub category: TagCategory,
}

impl TagDescriptor {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("Name can't be blank".to_string());
        }
        if self.yomi.trim().is_empty() {
            errors.push("Yomi can't be blank".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }
}

/// A dream together with its tag summaries, as returned by reads
#[derive(Debug, Clone, Serialize)]
pub struct DreamWithTags {
    pub dream: Dream,
    pub tags: Vec<Tag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, content: &str) -> DreamDraft {
        DreamDraft {
            title: title.to_string(),
            content: content.to_string(),
            emotion_color: EmotionColor::Peace,
            lucid_dream_flag: false,
            dreamed_at: Utc::now(),
        }
    }

    #[test]
    fn test_draft_valid() {
        let d = draft("古びた洋館", "地下室の奥で目が覚めた").sanitized().unwrap();
        assert_eq!(d.title, "古びた洋館");
    }

    #[test]
    fn test_draft_collects_every_violation() {
        let err = draft("", "").sanitized().unwrap_err();
        match err {
            Error::Validation(messages) => {
                assert_eq!(messages.len(), 2);
                assert!(messages.contains(&"Title can't be blank".to_string()));
                assert!(messages.contains(&"Content can't be blank".to_string()));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_draft_title_length_counts_chars_not_bytes() {
        // 15 Japanese characters is within the limit even though it is 45 bytes
        let ok = draft(&"夢".repeat(15), "内容").sanitized();
        assert!(ok.is_ok());

        let err = draft(&"夢".repeat(16), "内容").sanitized().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_draft_markup_only_content_is_blank() {
        let err = draft("題", "<p><br></p>").sanitized().unwrap_err();
        match err {
            Error::Validation(messages) => {
                assert!(messages.contains(&"Content can't be blank".to_string()));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_tag_new_always_classifies() {
        let tag = Tag::new(
            Uuid::new_v4(),
            "図書館".to_string(),
            "としょかん".to_string(),
            TagCategory::Place,
        );
        assert_eq!(tag.yomi_index, YomiIndex::Ta);
    }

    #[test]
    fn test_tag_descriptor_blank_fields() {
        let desc = TagDescriptor {
            name: "  ".to_string(),
            yomi: String::new(),
            category: TagCategory::Person,
        };
        let err = desc.validate().unwrap_err();
        match err {
            Error::Validation(messages) => assert_eq!(messages.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_serde_uses_fixed_labels() {
        assert_eq!(
            serde_json::to_string(&YomiIndex::Alnum).unwrap(),
            "\"英数字\""
        );
        assert_eq!(
            serde_json::to_string(&EmotionColor::Elation).unwrap(),
            "\"elation\""
        );
        let category: TagCategory = serde_json::from_str("\"place\"").unwrap();
        assert_eq!(category, TagCategory::Place);
        // Unknown labels are rejected at the boundary
        assert!(serde_json::from_str::<EmotionColor>("\"angry\"").is_err());
    }

    #[test]
    fn test_enum_labels_round_trip() {
        assert_eq!(EmotionColor::from_label("peace"), Some(EmotionColor::Peace));
        assert_eq!(EmotionColor::from_label("angry"), None);
        assert_eq!(TagCategory::from_label("place"), Some(TagCategory::Place));
        for idx in YomiIndex::ALL {
            assert_eq!(YomiIndex::from_label(idx.label()), Some(idx));
        }
    }
}

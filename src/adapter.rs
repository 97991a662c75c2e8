// src/adapter.rs - Maps raw detector output onto semantic categories
use crate::detector::RawDetection;
use once_cell::sync::Lazy;

/// Semantic category a raw class label maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    None,
    Pen,
    Phone,
    Key,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::None => "none",
            Category::Pen => "pen",
            Category::Phone => "phone",
            Category::Key => "key",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

struct CategoryRule {
    category: Category,
    synonyms: Vec<&'static str>,
}

// Ordered lookup table. Synonyms are stored lowercase; matching is
// case-insensitive and the first rule containing the name wins.
static CATEGORY_TABLE: Lazy<Vec<CategoryRule>> = Lazy::new(|| {
    vec![
        CategoryRule {
            category: Category::Pen,
            synonyms: vec!["pencil", "pen", "toothbrush"],
        },
        CategoryRule {
            category: Category::Phone,
            synonyms: vec!["cell phone", "mobile phone", "phone"],
        },
        CategoryRule {
            category: Category::Key,
            synonyms: vec!["key", "remote", "coin"],
        },
    ]
});

pub fn map_class(name: &str) -> Category {
    let name = name.to_lowercase();
    for rule in CATEGORY_TABLE.iter() {
        if rule.synonyms.iter().any(|s| *s == name) {
            return rule.category;
        }
    }
    Category::None
}

#[derive(Debug, Clone, Copy)]
pub struct AdapterSettings {
    /// Minimum confidence score, 0.0 to 1.0.
    pub score_threshold: f32,
    /// Detections kept per frame after filtering.
    pub max_results: usize,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            score_threshold: 0.5,
            max_results: 5,
        }
    }
}

/// Reduces one frame's worth of detections to a single category label.
///
/// Entries below the score threshold are dropped, the remainder is capped at
/// `max_results`, and the first surviving detection whose class maps to a
/// real category decides the frame. No match anywhere yields `Category::None`.
pub fn frame_label(detections: &[RawDetection], settings: &AdapterSettings) -> Category {
    let surviving = detections
        .iter()
        .filter(|d| d.score >= settings.score_threshold)
        .take(settings.max_results);

    for detection in surviving {
        let mapped = map_class(&detection.class_name);
        if mapped != Category::None {
            return mapped;
        }
    }

    Category::None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(name: &str, score: f32) -> RawDetection {
        RawDetection {
            class_name: name.to_string(),
            score,
        }
    }

    #[test]
    fn mapping_is_case_insensitive() {
        assert_eq!(map_class("Cell Phone"), Category::Phone);
        assert_eq!(map_class("cell phone"), Category::Phone);
        assert_eq!(map_class("PENCIL"), Category::Pen);
        assert_eq!(map_class("Remote"), Category::Key);
    }

    #[test]
    fn unmapped_names_yield_none() {
        assert_eq!(map_class("chair"), Category::None);
        assert_eq!(map_class("person"), Category::None);
        assert_eq!(map_class(""), Category::None);
    }

    #[test]
    fn below_threshold_detections_are_dropped() {
        let settings = AdapterSettings {
            score_threshold: 0.6,
            max_results: 5,
        };
        let dets = vec![det("pen", 0.59), det("chair", 0.9)];
        assert_eq!(frame_label(&dets, &settings), Category::None);
    }

    #[test]
    fn first_mappable_detection_wins() {
        let settings = AdapterSettings::default();
        let dets = vec![det("chair", 0.9), det("pen", 0.8), det("cell phone", 0.95)];
        assert_eq!(frame_label(&dets, &settings), Category::Pen);
    }

    #[test]
    fn truncation_happens_before_mapping() {
        let settings = AdapterSettings {
            score_threshold: 0.5,
            max_results: 2,
        };
        // The only mappable detection sits past the cap, so it never counts.
        let dets = vec![det("chair", 0.9), det("person", 0.9), det("key", 0.9)];
        assert_eq!(frame_label(&dets, &settings), Category::None);
    }

    #[test]
    fn empty_frame_yields_none() {
        let settings = AdapterSettings::default();
        assert_eq!(frame_label(&[], &settings), Category::None);
    }

    #[test]
    fn threshold_is_inclusive() {
        let settings = AdapterSettings {
            score_threshold: 0.5,
            max_results: 5,
        };
        assert_eq!(frame_label(&[det("key", 0.5)], &settings), Category::Key);
    }
}

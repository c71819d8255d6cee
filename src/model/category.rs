use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way the hand is scored: PLUS hands add points, MINUS hands subtract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HandMode {
    Plus,
    Minus,
}

impl HandMode {
    pub const ALL: [HandMode; 2] = [HandMode::Plus, HandMode::Minus];

    pub fn sign(&self) -> i32 {
        match self {
            HandMode::Plus => 1,
            HandMode::Minus => -1,
        }
    }

    /// Parse hand mode from string
    pub fn from_str(s: &str) -> Option<HandMode> {
        match s.trim().to_uppercase().as_str() {
            "PLUS" | "P" | "+" => Some(HandMode::Plus),
            "MINUS" | "M" | "-" => Some(HandMode::Minus),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HandMode::Plus => "PLUS",
            HandMode::Minus => "MINUS",
        }
    }
}

impl fmt::Display for HandMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scoring category of a Trix hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    King,
    Queens,
    Diamonds,
    Collections,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::King,
        Category::Queens,
        Category::Diamonds,
        Category::Collections,
    ];

    /// Points per unit taken (not a flat amount)
    pub fn point_value(&self) -> i32 {
        match self {
            Category::King => 75,
            Category::Queens => 25,
            Category::Diamonds => 10,
            Category::Collections => 15,
        }
    }

    /// Maximum count across all four players in a single round
    pub fn max_count(&self) -> u32 {
        match self {
            Category::King => 1,
            Category::Queens => 4,
            Category::Diamonds => 13,
            Category::Collections => 13,
        }
    }

    /// Only the king of hearts and the queens can be doubled
    pub fn is_doublable(&self) -> bool {
        matches!(self, Category::King | Category::Queens)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::King => "king",
            Category::Queens => "queens",
            Category::Diamonds => "diamonds",
            Category::Collections => "collections",
        }
    }

    pub fn from_char(c: char) -> Option<Category> {
        match c.to_ascii_uppercase() {
            'K' => Some(Category::King),
            'Q' => Some(Category::Queens),
            'D' => Some(Category::Diamonds),
            'C' => Some(Category::Collections),
            _ => None,
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            Category::King => 'K',
            Category::Queens => 'Q',
            Category::Diamonds => 'D',
            Category::Collections => 'C',
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Count taken in one category by one player, with the doubling flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryEntry {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub doubled: bool,
}

impl CategoryEntry {
    pub fn new(count: u32, doubled: bool) -> Self {
        Self { count, doubled }
    }
}

/// One player's entries for every category of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerEntries {
    #[serde(default)]
    pub king: CategoryEntry,
    #[serde(default)]
    pub queens: CategoryEntry,
    #[serde(default)]
    pub diamonds: CategoryEntry,
    #[serde(default)]
    pub collections: CategoryEntry,
}

impl PlayerEntries {
    pub fn get(&self, category: Category) -> &CategoryEntry {
        match category {
            Category::King => &self.king,
            Category::Queens => &self.queens,
            Category::Diamonds => &self.diamonds,
            Category::Collections => &self.collections,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut CategoryEntry {
        match category {
            Category::King => &mut self.king,
            Category::Queens => &mut self.queens,
            Category::Diamonds => &mut self.diamonds,
            Category::Collections => &mut self.collections,
        }
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.get(*c).count == 0)
    }

    /// Compact notation, e.g. "K Q2x D3"
    pub fn to_notation(&self) -> String {
        let parts: Vec<String> = Category::ALL
            .iter()
            .filter_map(|c| {
                let entry = self.get(*c);
                if entry.count == 0 {
                    return None;
                }
                let mut s = c.to_char().to_string();
                if entry.count != 1 {
                    s.push_str(&entry.count.to_string());
                }
                if entry.doubled {
                    s.push('x');
                }
                Some(s)
            })
            .collect();

        if parts.is_empty() {
            "-".to_string()
        } else {
            parts.join(" ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hand_mode_parsing() {
        assert_eq!(HandMode::from_str("plus"), Some(HandMode::Plus));
        assert_eq!(HandMode::from_str(" MINUS "), Some(HandMode::Minus));
        assert_eq!(HandMode::from_str("+"), Some(HandMode::Plus));
        assert_eq!(HandMode::from_str("complex"), None);
    }

    #[test]
    fn test_hand_mode_serde_names() {
        assert_eq!(serde_json::to_string(&HandMode::Plus).unwrap(), "\"PLUS\"");
        let mode: HandMode = serde_json::from_str("\"MINUS\"").unwrap();
        assert_eq!(mode, HandMode::Minus);
    }

    #[test]
    fn test_category_constants() {
        let values: Vec<i32> = Category::ALL.iter().map(|c| c.point_value()).collect();
        assert_eq!(values, vec![75, 25, 10, 15]);
        let maxes: Vec<u32> = Category::ALL.iter().map(|c| c.max_count()).collect();
        assert_eq!(maxes, vec![1, 4, 13, 13]);
        assert!(Category::King.is_doublable());
        assert!(Category::Queens.is_doublable());
        assert!(!Category::Diamonds.is_doublable());
        assert!(!Category::Collections.is_doublable());
    }

    #[test]
    fn test_missing_entries_deserialize_as_zero() {
        let entries: PlayerEntries = serde_json::from_str(r#"{"queens": {"count": 2}}"#).unwrap();
        assert_eq!(entries.queens, CategoryEntry::new(2, false));
        assert_eq!(entries.king, CategoryEntry::default());
        assert!(!entries.is_empty());
    }

    #[test]
    fn test_to_notation() {
        let mut entries = PlayerEntries::default();
        assert_eq!(entries.to_notation(), "-");

        entries.king = CategoryEntry::new(1, true);
        entries.diamonds = CategoryEntry::new(3, false);
        assert_eq!(entries.to_notation(), "Kx D3");
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Point category; doubles as the club type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Category {
    Technical,
    Cultural,
    Sports,
    Social,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Technical,
        Category::Cultural,
        Category::Sports,
        Category::Social,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Technical => "technical",
            Category::Cultural => "cultural",
            Category::Sports => "sports",
            Category::Social => "social",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
                format!("Invalid category. Must be one of: {}", names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!("Technical".parse::<Category>(), Ok(Category::Technical));
        assert_eq!("SPORTS".parse::<Category>(), Ok(Category::Sports));
    }

    #[test]
    fn unknown_category_lists_valid_names() {
        let err = "robotics".parse::<Category>().unwrap_err();
        assert!(err.contains("technical, cultural, sports, social"));
    }
}

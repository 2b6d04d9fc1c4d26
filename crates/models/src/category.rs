use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Plumbing,
    Electrical,
    Cleaning,
    Carpentry,
    Painting,
    Hvac,
    ApplianceRepair,
    PestControl,
    Landscaping,
    Moving,
    Other,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Plumbing,
        Category::Electrical,
        Category::Cleaning,
        Category::Carpentry,
        Category::Painting,
        Category::Hvac,
        Category::ApplianceRepair,
        Category::PestControl,
        Category::Landscaping,
        Category::Moving,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Plumbing => "plumbing",
            Category::Electrical => "electrical",
            Category::Cleaning => "cleaning",
            Category::Carpentry => "carpentry",
            Category::Painting => "painting",
            Category::Hvac => "hvac",
            Category::ApplianceRepair => "appliance_repair",
            Category::PestControl => "pest_control",
            Category::Landscaping => "landscaping",
            Category::Moving => "moving",
            Category::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Plumbing => "Plumbing",
            Category::Electrical => "Electrical",
            Category::Cleaning => "Cleaning",
            Category::Carpentry => "Carpentry",
            Category::Painting => "Painting",
            Category::Hvac => "HVAC",
            Category::ApplianceRepair => "Appliance Repair",
            Category::PestControl => "Pest Control",
            Category::Landscaping => "Landscaping",
            Category::Moving => "Moving",
            Category::Other => "Other",
        }
    }

    /// Best-effort category for free-form skill text such as "Pipe plumbing".
    /// Unknown skills land in `Other`.
    pub fn from_skill(skill: &str) -> Category {
        if let Ok(c) = skill.parse() {
            return c;
        }
        let text = skill.to_ascii_lowercase();
        Category::ALL
            .iter()
            .copied()
            .filter(|c| *c != Category::Other)
            .find(|c| text.contains(&c.as_str().replace('_', " ")) || text.contains(c.as_str()))
            .unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == norm)
            .ok_or_else(|| ModelError::validation(format!("invalid category '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_separators() {
        assert_eq!("Pest Control".parse::<Category>().unwrap(), Category::PestControl);
        assert_eq!("appliance-repair".parse::<Category>().unwrap(), Category::ApplianceRepair);
        assert_eq!("HVAC".parse::<Category>().unwrap(), Category::Hvac);
    }

    #[test]
    fn rejects_unknown() {
        let err = "gardening-ish".parse::<Category>().unwrap_err();
        assert!(err.to_string().contains("invalid category"));
    }

    #[test]
    fn skill_text_maps_to_category() {
        assert_eq!(Category::from_skill("Emergency plumbing"), Category::Plumbing);
        assert_eq!(Category::from_skill("interior painting"), Category::Painting);
        assert_eq!(Category::from_skill("tailoring"), Category::Other);
    }

    #[test]
    fn serde_uses_snake_case() {
        let v = serde_json::to_value(Category::PestControl).unwrap();
        assert_eq!(v, "pest_control");
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Distinguishes a committed meal plan from a scheduling-conflict preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    #[default]
    Current,
    Preview,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
}

impl RecipeInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            ingredient: None,
            thumbnail: None,
            price: None,
        }
    }
}

/// One day of a meal plan; `meals` maps a slot name ("아침", "점심", ...) to a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPlan {
    pub day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_str: Option<String>,
    #[serde(default)]
    pub meals: BTreeMap<String, RecipeInfo>,
}

impl DailyPlan {
    pub fn new(day: u32) -> Self {
        Self {
            day,
            date_str: None,
            meals: BTreeMap::new(),
        }
    }

    pub fn with_meal(mut self, slot: impl Into<String>, recipe: RecipeInfo) -> Self {
        self.meals.insert(slot.into(), recipe);
        self
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One logged food item with its macro estimate.
///
/// `id` is assigned by the store on insert; an id of 0 means "not yet
/// persisted". `logged_at` is the creation instant and the sole temporal
/// key for day bucketing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodEntry {
    pub id: i64,
    pub name: String,
    pub calories: i64,
    pub protein: i64,
    pub logged_at: DateTime<Utc>,
}

impl FoodEntry {
    pub fn new(name: impl Into<String>, calories: i64, protein: i64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            calories,
            protein,
            logged_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn with_logged_at(mut self, logged_at: DateTime<Utc>) -> Self {
        self.logged_at = logged_at;
        self
    }
}

impl fmt::Display for FoodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} kcal, {}g protein",
            self.name, self.calories, self.protein
        )
    }
}

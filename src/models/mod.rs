mod food_entry;

pub use food_entry::FoodEntry;

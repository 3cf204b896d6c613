mod resolver;

pub use resolver::{MealResolver, ResolveError};

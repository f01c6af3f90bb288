pub mod rating;
pub mod inventory;
pub mod reviews;

pub use rating::{next_average, mean_rating, RatingUpdate};
pub use inventory::{reduce_stock, StockAdjustment};
pub use reviews::{ReviewService, ReviewSubmission, ReviewSummary, ReviewError};

pub mod model;

pub use model::{summarize, RevenueSummary, StatusCounts, VehicleRevenue};

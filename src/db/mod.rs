pub mod dataset;
pub mod travel_links;

pub use dataset::Dataset;
pub use travel_links::TravelLinkTable;

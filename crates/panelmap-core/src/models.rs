pub mod feature;
pub mod geometry;
pub mod record;

pub use feature::{
    feature_collection, EnrichedFeature, SiteFeature, Status, TableLabelPoint, TableOutline,
};
pub use geometry::{Geometry, Position, Ring};
pub use record::{DailyRecord, DailySubmission};

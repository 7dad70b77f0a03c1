//! Exchange-neutral value types shared by the feature graph and the file
//! format: geometry fingerprints, units, standard datum IDs, feature ID
//! generation, reference entities and sketch contents.

pub mod errors;
pub mod geometry;
pub mod ids;
pub mod reference;
pub mod sketch;
pub mod standard;
pub mod units;

pub use errors::*;
pub use geometry::*;
pub use ids::IdGenerator;
pub use reference::*;
pub use sketch::*;
pub use units::*;

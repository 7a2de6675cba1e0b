/// A point on the Earth's surface and the distance between two of them
mod geo_point;

pub use self::geo_point::*;

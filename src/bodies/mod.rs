mod body;
mod mass_properties;

pub use self::body::Body;
pub use self::mass_properties::MassProperties;

mod canonical;
mod types;

pub use canonical::{canonicalize, description_key};
pub use types::{Country, Language, Place, PlaceDescription};

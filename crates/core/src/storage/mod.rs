mod error;
mod traits;

pub use error::{LookupError, Result};
pub use traits::{
    CountrySource, CountryStore, LanguageStore, PlaceDescriptionStore, PlaceSource, PlaceStore,
};

//! External collaborators of the OCR pipeline
//!
//! OCR, dictionary and chat are reached only through the traits in
//! [`provider`]. Today each has a fixed-data stand-in; a real engine slots in by
//! implementing the same trait and registering it in [`ProviderRegistry`].

pub mod cache;
pub mod gate;
pub mod provider;
pub mod registry;
pub mod stand_in;

pub use cache::CachedDictionary;
pub use gate::ProviderGate;
pub use provider::{ChatResponder, DictionaryProvider, OcrImage, OcrProvider};
pub use registry::ProviderRegistry;
pub use stand_in::{StandInChat, StandInDictionary, StandInOcr};

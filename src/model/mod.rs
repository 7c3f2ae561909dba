// src/model/mod.rs

//! Feed, requirement and selection data model
//!
//! Feeds are parsed documents describing implementations of an interface.
//! Requirements are what a caller asks for, and selections are what the
//! solver hands back.

mod feed;
mod requirements;
mod selection;
mod stability;
mod uri;

pub use feed::{
    Archive, Command, Dependency, Element, ExternalPackage, Feed, FeedReference, Implementation,
    Importance, PackageImplementation, Retrieval,
};
pub use requirements::{Requirements, DEFAULT_COMMAND};
pub use selection::{Selection, Selections};
pub use stability::Stability;
pub use uri::{escape_component, FeedUri, DISTRIBUTION_PREFIX};

//! Capability traits implemented selectively by response item types.
//!
//! Builders are generic over these small traits instead of one fat base type:
//! an item that has an owner implements [`WithOwner`], an item that lives in a
//! project implements [`WithProject`], and so on.

use serde::Serialize;
use uuid::Uuid;

/// A type that appears inside a `tsResponse` envelope.
///
/// `ELEMENT` is the element name of one item (`user`), `COLLECTION` the name
/// of the wrapping list element (`users`).
pub trait ResponseItem: Serialize + Clone + Send + 'static {
    const ELEMENT: &'static str;
    const COLLECTION: &'static str;
}

/// Anything addressed by a REST id.
pub trait RestIdentifiable {
    fn id(&self) -> Uuid;
}

pub trait NamedContent {
    fn name(&self) -> &str;
}

pub trait WithContentUrl {
    fn content_url(&self) -> Option<&str>;
}

pub trait WithOwner {
    fn owner_id(&self) -> Option<Uuid>;
}

pub trait WithProject {
    fn project_id(&self) -> Option<Uuid>;
}

pub trait WithTags {
    fn tag_labels(&self) -> Vec<&str>;
}

/// Implements [`RestIdentifiable`] and [`NamedContent`] for DTOs with plain
/// `id: Uuid` and `name: String` fields.
#[macro_export]
macro_rules! impl_rest_identity {
    ($item:ty) => {
        impl $crate::api::traits::RestIdentifiable for $item {
            fn id(&self) -> ::uuid::Uuid {
                self.id
            }
        }

        impl $crate::api::traits::NamedContent for $item {
            fn name(&self) -> &str {
                &self.name
            }
        }
    };
}

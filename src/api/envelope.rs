//! `tsResponse` envelopes.
//!
//! Every response body is one of four shapes: error only, one item, a list,
//! or a page of items with pagination metadata. The item element names come
//! from [`ResponseItem`].

use super::models::{ErrorType, Pagination};
use super::rest_error::RestError;
use super::serialization::{HttpContentSerializer, MediaType};
use super::traits::ResponseItem;
use crate::error::SerializationError;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

pub const API_NAMESPACE: &str = "http://tableau.com/api";

/// A response body that can be rendered for a negotiated media type.
pub trait Envelope: Send {
    fn render(&self, media_type: MediaType) -> Result<Vec<u8>, SerializationError>;
}

impl<T> Envelope for T
where
    T: Serialize + Send,
{
    fn render(&self, media_type: MediaType) -> Result<Vec<u8>, SerializationError> {
        HttpContentSerializer::serialize(self, media_type)
    }
}

fn serialize_error<S: SerializeStruct>(
    state: &mut S,
    error: &Option<ErrorType>,
) -> Result<(), S::Error> {
    match error {
        Some(error) => state.serialize_field("error", error),
        None => state.skip_field("error"),
    }
}

/// `<users><user/>...</users>`
struct Collection<'a, T>(&'a [T]);

impl<T: ResponseItem> Serialize for Collection<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct(T::COLLECTION, 1)?;
        state.serialize_field(T::ELEMENT, self.0)?;
        state.end()
    }
}

/// Error-only envelope, also used for bodies that carry nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmptyResponse {
    pub error: Option<ErrorType>,
}

impl EmptyResponse {
    pub fn error(error: &RestError) -> Self {
        Self {
            error: Some(error.to_error_type()),
        }
    }
}

impl Serialize for EmptyResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("tsResponse", 2)?;
        state.serialize_field("@xmlns", API_NAMESPACE)?;
        serialize_error(&mut state, &self.error)?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemResponse<T> {
    pub item: Option<T>,
    pub error: Option<ErrorType>,
}

impl<T> ItemResponse<T> {
    pub fn new(item: T) -> Self {
        Self {
            item: Some(item),
            error: None,
        }
    }
}

impl<T: ResponseItem> Serialize for ItemResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("tsResponse", 3)?;
        state.serialize_field("@xmlns", API_NAMESPACE)?;
        serialize_error(&mut state, &self.error)?;
        match &self.item {
            Some(item) => state.serialize_field(T::ELEMENT, item)?,
            None => state.skip_field(T::ELEMENT)?,
        }
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub error: Option<ErrorType>,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, error: None }
    }
}

impl<T: ResponseItem> Serialize for ListResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("tsResponse", 3)?;
        state.serialize_field("@xmlns", API_NAMESPACE)?;
        serialize_error(&mut state, &self.error)?;
        state.serialize_field(T::COLLECTION, &Collection(&self.items))?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PagedResponse<T> {
    pub pagination: Pagination,
    pub items: Vec<T>,
    pub error: Option<ErrorType>,
}

impl<T> PagedResponse<T> {
    pub fn new(pagination: Pagination, items: Vec<T>) -> Self {
        Self {
            pagination,
            items,
            error: None,
        }
    }
}

impl<T: ResponseItem> Serialize for PagedResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("tsResponse", 4)?;
        state.serialize_field("@xmlns", API_NAMESPACE)?;
        serialize_error(&mut state, &self.error)?;
        state.serialize_field("pagination", &self.pagination)?;
        state.serialize_field(T::COLLECTION, &Collection(&self.items))?;
        state.end()
    }
}

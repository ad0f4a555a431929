use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use super::error::DecodeError;

/// An untyped (JSON) Object from which [TypedParameters](TypedParameter) can be parsed.
///
/// Represents an envelope, such as an authorization request or a verifiable
/// presentation, in which a presentation definition or submission is embedded.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UntypedObject(pub(crate) Map<String, Json>);

/// A strongly typed parameter stored under a well-known key of an envelope.
pub trait TypedParameter: TryFrom<Json, Error = DecodeError> + Clone + std::fmt::Debug {
    const KEY: &'static str;
}

impl UntypedObject {
    /// Get a [TypedParameter] from the Object.
    ///
    /// Note that this method clones the underlying data.
    pub fn get<T: TypedParameter>(&self) -> Option<Result<T, DecodeError>> {
        Some(self.0.get(T::KEY)?.clone().try_into())
    }

    /// Remove a [TypedParameter] from the Object.
    pub fn remove<T: TypedParameter>(&mut self) -> Option<Result<T, DecodeError>> {
        Some(self.0.remove(T::KEY)?.try_into())
    }

    /// Remove the raw JSON stored under the key of a [TypedParameter], without decoding it.
    pub fn take_raw<T: TypedParameter>(&mut self) -> Option<Json> {
        self.0.remove(T::KEY)
    }

    /// Insert a [TypedParameter].
    ///
    /// Returns the existing [TypedParameter] if one already exists.
    ///
    /// # Errors
    /// Returns an error if the parameter could not be encoded, or if there was
    /// already an entry in the Object but it could not be decoded.
    pub fn insert<T: TypedParameter + Serialize>(&mut self, t: T) -> Option<Result<T, DecodeError>> {
        match serde_json::to_value(t) {
            Err(e) => Some(Err(e.into())),
            Ok(value) => Some(self.0.insert(T::KEY.to_owned(), value)?.try_into()),
        }
    }
}

impl From<UntypedObject> for Json {
    fn from(value: UntypedObject) -> Self {
        value.0.into()
    }
}

impl From<Map<String, Json>> for UntypedObject {
    fn from(value: Map<String, Json>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::presentation_definition::PresentationDefinition;

    #[test]
    fn typed_parameters() {
        let definition = json!({
            "id": "pd",
            "input_descriptors": [
                { "id": "a", "constraints": { "limit_disclosure": "required" } }
            ]
        });

        let mut object: UntypedObject = serde_json::from_value(json!({
            "client_id": "verifier",
            "presentation_definition": definition
        }))
        .unwrap();

        let decoded = object.get::<PresentationDefinition>().unwrap().unwrap();
        assert_eq!(decoded.id().as_str(), "pd");

        assert!(object.insert(decoded.clone()).unwrap().is_ok());
        assert_eq!(object.remove::<PresentationDefinition>().unwrap().unwrap(), decoded);
        assert!(object.get::<PresentationDefinition>().is_none());

        object.0.insert("presentation_definition".into(), json!("nope"));
        assert!(object.get::<PresentationDefinition>().unwrap().is_err());
    }
}

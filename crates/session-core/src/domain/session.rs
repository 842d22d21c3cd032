//! Session domain entity

use serde::{Deserialize, Serialize};

/// The value persisted for one session id: the caller's data plus an
/// optional flash value that survives exactly one read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashSessionData<D, F = D> {
    pub data: D,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<F>,
}

impl<D, F> FlashSessionData<D, F> {
    pub fn new(data: D) -> Self {
        Self { data, flash: None }
    }

    pub fn with_flash(mut self, flash: F) -> Self {
        self.flash = Some(flash);
        self
    }
}

impl<D: Default, F> Default for FlashSessionData<D, F> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

/// A session as seen by request handlers.
///
/// An empty id means the session has never been stored; committing it
/// creates a record, committing a session with an id overwrites it.
#[derive(Debug, Clone, PartialEq)]
pub struct Session<D, F = D> {
    id: String,
    payload: FlashSessionData<D, F>,
}

impl<D, F> Session<D, F> {
    pub fn new(id: impl Into<String>, payload: FlashSessionData<D, F>) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_new(&self) -> bool {
        self.id.is_empty()
    }

    pub fn data(&self) -> &D {
        &self.payload.data
    }

    pub fn data_mut(&mut self) -> &mut D {
        &mut self.payload.data
    }

    pub fn set_data(&mut self, data: D) {
        self.payload.data = data;
    }

    /// Store a value readable on the next request only.
    pub fn flash(&mut self, value: F) {
        self.payload.flash = Some(value);
    }

    pub fn has_flash(&self) -> bool {
        self.payload.flash.is_some()
    }

    /// Look at the flash value without consuming it.
    pub fn peek_flash(&self) -> Option<&F> {
        self.payload.flash.as_ref()
    }

    /// Consume the flash value; it is dropped on the next commit.
    pub fn take_flash(&mut self) -> Option<F> {
        self.payload.flash.take()
    }

    pub fn payload(&self) -> &FlashSessionData<D, F> {
        &self.payload
    }

    pub fn into_payload(self) -> FlashSessionData<D, F> {
        self.payload
    }
}

impl<D: Default, F> Default for Session<D, F> {
    fn default() -> Self {
        Self::new(String::new(), FlashSessionData::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Visits {
        count: u32,
    }

    #[test]
    fn test_new_session_has_empty_id() {
        let session: Session<Visits, String> = Session::default();
        assert!(session.is_new());
        assert_eq!(session.id(), "");
        assert_eq!(session.data(), &Visits::default());
    }

    #[test]
    fn test_flash_is_consumed_once() {
        let mut session: Session<Visits, String> = Session::new("abc", FlashSessionData::default());
        session.flash("saved".to_string());
        assert!(session.has_flash());
        assert_eq!(session.peek_flash().map(String::as_str), Some("saved"));

        assert_eq!(session.take_flash().as_deref(), Some("saved"));
        assert_eq!(session.take_flash(), None);
        assert!(session.payload().flash.is_none());
    }

    #[test]
    fn test_data_mut_updates_payload() {
        let mut session: Session<Visits> = Session::default();
        session.data_mut().count += 2;
        assert_eq!(session.into_payload().data.count, 2);
    }

    #[test]
    fn test_payload_wire_format() {
        let plain: FlashSessionData<Visits, String> = FlashSessionData::new(Visits { count: 1 });
        assert_eq!(serde_json::to_value(&plain).unwrap(), json!({ "data": { "count": 1 } }));

        let flashed = plain.clone().with_flash("hi".to_string());
        assert_eq!(
            serde_json::to_value(&flashed).unwrap(),
            json!({ "data": { "count": 1 }, "flash": "hi" })
        );

        let parsed: FlashSessionData<Visits, String> =
            serde_json::from_str(r#"{"data":{"count":1}}"#).unwrap();
        assert_eq!(parsed, plain);
    }
}

//! Per-action choice of input/output shape for each resource.
//!
//! A [`ShapeTable`] maps a viewset action to the shape its payload uses.
//! Write actions resolve through: explicit override, then (for a partial
//! update) the full-update override, then the general writable shape, then
//! the default. Read actions resolve through: explicit override, then the
//! general readable shape, then the default.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::dto::{ExperienceWrite, UserCreate, UserUpdate};
use crate::error::{AppError, AppResult};
use crate::utils::validate::{CheckedInput, WriteMode, check};

/// A resource action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Create,
    Retrieve,
    Update,
    PartialUpdate,
    Destroy,
    /// A named extra action such as `me` or `restore`.
    Custom(&'static str),
}

impl Action {
    /// Actions whose payload is written by the client.
    pub fn is_write(self) -> bool {
        matches!(self, Action::Create | Action::Update | Action::PartialUpdate)
    }

    /// Actions that never change state.
    pub fn is_safe(self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }

    pub fn write_mode(self) -> WriteMode {
        if self == Action::PartialUpdate {
            WriteMode::Partial
        } else {
            WriteMode::Full
        }
    }
}

/// Shape lookup for one resource.
#[derive(Debug, Clone)]
pub struct ShapeTable<S> {
    default: S,
    writable: Option<S>,
    readable: Option<S>,
    overrides: Vec<(Action, S)>,
}

impl<S: Copy> ShapeTable<S> {
    pub fn new(default: S) -> Self {
        Self {
            default,
            writable: None,
            readable: None,
            overrides: Vec::new(),
        }
    }

    pub fn writable(mut self, shape: S) -> Self {
        self.writable = Some(shape);
        self
    }

    pub fn readable(mut self, shape: S) -> Self {
        self.readable = Some(shape);
        self
    }

    /// Pins `action` to `shape`, replacing any earlier override.
    pub fn with_override(mut self, action: Action, shape: S) -> Self {
        self.overrides.retain(|(a, _)| *a != action);
        self.overrides.push((action, shape));
        self
    }

    fn override_for(&self, action: Action) -> Option<S> {
        self.overrides
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, shape)| *shape)
    }

    pub fn resolve(&self, action: Action) -> S {
        if let Some(shape) = self.override_for(action) {
            return shape;
        }

        if action.is_write() {
            if action == Action::PartialUpdate
                && let Some(shape) = self.override_for(Action::Update)
            {
                return shape;
            }
            self.writable.unwrap_or(self.default)
        } else {
            self.readable.unwrap_or(self.default)
        }
    }
}

/// Parses a raw request body. An empty body reads as an empty object so
/// that missing fields are reported per field.
pub fn json_body(bytes: &[u8]) -> AppResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(bytes).map_err(|e| AppError::BadRequest {
        message: format!("Malformed JSON body: {}", e),
    })
}

/// Deserializes and checks a body in the given write mode.
pub fn decode<T>(body: Value, mode: WriteMode) -> AppResult<T>
where
    T: DeserializeOwned + CheckedInput,
{
    let value: T = serde_json::from_value(body).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;
    check(&value, mode)?;
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserShape {
    Create,
    Update,
    Readable,
}

/// A decoded user payload.
#[derive(Debug)]
pub enum UserInput {
    Create(UserCreate),
    Update(UserUpdate),
}

pub fn user_shapes() -> ShapeTable<UserShape> {
    ShapeTable::new(UserShape::Readable)
        .readable(UserShape::Readable)
        .with_override(Action::Create, UserShape::Create)
        .with_override(Action::Update, UserShape::Update)
}

impl UserShape {
    /// Decodes `body` as the input shape `action` resolves to.
    pub fn decode(action: Action, body: Value) -> AppResult<UserInput> {
        match user_shapes().resolve(action) {
            UserShape::Create => decode(body, action.write_mode()).map(UserInput::Create),
            UserShape::Update => decode(body, action.write_mode()).map(UserInput::Update),
            UserShape::Readable => Err(read_only(action)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceShape {
    Writable,
    Readable,
}

pub fn experience_shapes() -> ShapeTable<ExperienceShape> {
    ShapeTable::new(ExperienceShape::Readable)
        .writable(ExperienceShape::Writable)
        .readable(ExperienceShape::Readable)
}

impl ExperienceShape {
    pub fn decode(action: Action, body: Value) -> AppResult<ExperienceWrite> {
        match experience_shapes().resolve(action) {
            ExperienceShape::Writable => decode(body, action.write_mode()),
            ExperienceShape::Readable => Err(read_only(action)),
        }
    }
}

fn read_only(action: Action) -> AppError {
    AppError::Internal {
        source: anyhow::anyhow!("{:?} resolves to a read-only shape", action),
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Request construction from a flat argument list.
//!
//! Arguments are consumed left to right by a depth-first walk over the
//! schema. Nested messages draw from the same cursor as their parent, so
//! `[x, y, z, frame]` fills `pose.position.{x,y,z}` and then `pose.frame`.

use crate::error::ServiceError;
use crate::schema::{FieldKind, Schema};
use crate::value::{FieldValue, MessageInstance};
use std::vec;
use thiserror::Error;

/// Request building errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The argument list ran out. Carries every expected field path.
    #[error("Not enough arguments to call service.")]
    NotEnoughArguments { expected: Vec<String> },
}

impl From<BuildError> for ServiceError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::NotEnoughArguments { expected } => {
                ServiceError::ArgumentCountMismatch { expected }
            }
        }
    }
}

/// A filled instance plus the arguments it did not consume.
#[derive(Debug, Clone, PartialEq)]
pub struct Filled {
    pub instance: MessageInstance,
    pub leftover: Vec<FieldValue>,
}

/// Fill an instance of `schema` from `args`.
pub fn fill(schema: &Schema, args: Vec<FieldValue>) -> Result<Filled, BuildError> {
    let mut cursor = args.into_iter();
    let instance = fill_message(schema, &mut cursor).ok_or_else(|| {
        BuildError::NotEnoughArguments {
            expected: schema.scalar_paths(),
        }
    })?;
    let leftover: Vec<FieldValue> = cursor.collect();
    if !leftover.is_empty() {
        log::debug!(
            "[builder] {}: {} argument(s) left over",
            schema.name(),
            leftover.len()
        );
    }
    Ok(Filled { instance, leftover })
}

fn fill_message(schema: &Schema, cursor: &mut vec::IntoIter<FieldValue>) -> Option<MessageInstance> {
    let mut instance = MessageInstance::new(schema.name());
    for field in schema.fields() {
        let value = match &field.kind {
            FieldKind::Scalar(_) => cursor.next()?,
            FieldKind::Nested(id) => FieldValue::Message(fill_message(&schema.nested(*id), cursor)?),
        };
        instance.set(field.name.as_str(), value);
    }
    Some(instance)
}

/// Space-separated dotted paths of the arguments `schema` expects.
pub fn describe_arguments(schema: &Schema) -> String {
    schema.scalar_paths().join(" ")
}

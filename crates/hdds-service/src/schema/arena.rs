// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Arena-backed message schemas.

use std::fmt;
use std::sync::Arc;

/// Index of a message node in a [`SchemaArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub(crate) usize);

/// Kind of a message field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Leaf filled from exactly one argument. Holds the declared type,
    /// e.g. `int64`, `float64[]` or `geometry_msgs/Point[3]`.
    Scalar(String),
    /// Embedded message, filled field by field.
    Nested(MessageId),
}

/// A named field of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldDef {
    pub fn scalar(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Scalar(type_name.into()),
        }
    }

    pub fn nested(name: impl Into<String>, id: MessageId) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Nested(id),
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self.kind, FieldKind::Nested(_))
    }
}

/// A message type: fields in declaration order plus its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSchema {
    pub name: String,
    pub fields: Vec<FieldDef>,
    pub text: String,
}

/// Flat storage for message schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaArena {
    messages: Vec<MessageSchema>,
}

impl SchemaArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its id.
    pub fn push(&mut self, message: MessageSchema) -> MessageId {
        self.messages.push(message);
        MessageId(self.messages.len() - 1)
    }

    /// Get a message. Ids come from this arena, so lookup cannot miss.
    pub fn get(&self, id: MessageId) -> &MessageSchema {
        &self.messages[id.0]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MessageId, &MessageSchema)> {
        self.messages
            .iter()
            .enumerate()
            .map(|(i, m)| (MessageId(i), m))
    }
}

/// Handle on one message type inside a shared arena.
#[derive(Clone)]
pub struct Schema {
    arena: Arc<SchemaArena>,
    root: MessageId,
}

impl Schema {
    pub fn new(arena: Arc<SchemaArena>, root: MessageId) -> Self {
        Self { arena, root }
    }

    /// Build a standalone schema from a single message with scalar fields.
    pub fn flat(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        let mut arena = SchemaArena::new();
        let root = arena.push(MessageSchema {
            name: name.into(),
            fields,
            text: String::new(),
        });
        Self::new(Arc::new(arena), root)
    }

    pub fn id(&self) -> MessageId {
        self.root
    }

    pub fn arena(&self) -> &Arc<SchemaArena> {
        &self.arena
    }

    fn message(&self) -> &MessageSchema {
        self.arena.get(self.root)
    }

    /// Type name.
    pub fn name(&self) -> &str {
        &self.message().name
    }

    /// Definition text.
    pub fn text(&self) -> &str {
        &self.message().text
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.message().fields
    }

    /// Schema of a nested message type.
    pub fn nested(&self, id: MessageId) -> Schema {
        Schema::new(self.arena.clone(), id)
    }

    /// Dotted names of every scalar leaf, depth-first in declaration order.
    pub fn scalar_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths("", &mut paths);
        paths
    }

    fn collect_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for field in self.fields() {
            let path = format!("{}{}", prefix, field.name);
            match &field.kind {
                FieldKind::Scalar(_) => out.push(path),
                FieldKind::Nested(id) => {
                    self.nested(*id).collect_paths(&format!("{}.", path), out);
                }
            }
        }
    }

    /// Number of arguments a full fill consumes.
    pub fn scalar_count(&self) -> usize {
        self.fields()
            .iter()
            .map(|field| match &field.kind {
                FieldKind::Scalar(_) => 1,
                FieldKind::Nested(id) => self.nested(*id).scalar_count(),
            })
            .sum()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name())
            .field("fields", &self.fields())
            .finish()
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.arena, &other.arena) && self.root == other.root
    }
}

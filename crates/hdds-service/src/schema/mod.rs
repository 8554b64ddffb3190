// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service and message schemas known at runtime.
//!
//! Schemas live in an arena of message nodes addressed by [`MessageId`]; a
//! nested field stores the id of its message type instead of owning it.
//!
//! # Features
//!
//! - **SchemaArena / Schema**: ordered field lists, dotted scalar paths
//! - **Definition parser**: `.msg` / `.srv` text (`type name` lines)
//! - **SchemaRegistry**: explicit type-name -> schema lookup, populated at
//!   start-up from definition text or a package directory tree
//!
//! # Example
//!
//! ```rust
//! use hdds_service::schema::{SchemaRegistryBuilder, SchemaSource, LoadedType};
//!
//! let registry = SchemaRegistryBuilder::new()
//!     .add_service("rospy_tutorials/AddTwoInts", "int64 a\nint64 b\n---\nint64 sum\n")
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! match registry.load("rospy_tutorials/AddTwoInts") {
//!     Some(LoadedType::Service(srv)) => {
//!         assert_eq!(srv.request.scalar_paths(), vec!["a", "b"]);
//!     }
//!     _ => unreachable!(),
//! }
//! ```

mod arena;
mod parser;
mod registry;

pub use arena::{FieldDef, FieldKind, MessageId, MessageSchema, Schema, SchemaArena};
pub use parser::{parse_definition, split_service_text, FieldDecl, BUILTIN_TYPES};
pub use registry::{
    LoadedType, SchemaRegistry, SchemaRegistryBuilder, SchemaSource, ServiceSchema,
    REQUEST_SUFFIX, RESPONSE_SUFFIX,
};

use thiserror::Error;

/// Errors raised while loading definitions.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("{type_name}:{line}: invalid declaration '{text}'")]
    InvalidLine {
        type_name: String,
        line: usize,
        text: String,
    },

    #[error("invalid type name: {0}")]
    InvalidName(String),

    #[error("type {0} is defined twice")]
    Duplicate(String),

    #[error("{type_name}.{field}: unknown type {missing}")]
    UnknownType {
        type_name: String,
        field: String,
        missing: String,
    },

    #[error("type {0} contains itself")]
    RecursiveType(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

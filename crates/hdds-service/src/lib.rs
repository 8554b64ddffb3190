// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HDDS Service Introspection
//!
//! Discovers, inspects and calls request/response services registered with
//! a ROS-style master, without compile-time knowledge of their types.
//!
//! # Features
//!
//! - **Registry Client**: service lookup and listing through a master handle
//! - **Header Probe**: length-prefixed `key=value` handshake that reveals a
//!   service's type without calling it
//! - **Type Resolution**: probe result -> local schema, with the
//!   `FooRequest` -> `Foo` fallback for peers advertising the request type
//! - **Request Builder**: fills nested requests from a flat argument list
//! - **Invoker**: resolve, fill and call in one step
//!
//! The master RPC, the call transport and the schema source are traits
//! ([`MasterApi`], [`CallTransport`], [`SchemaSource`]) so the embedding
//! client library supplies them.
//!
//! # Configuration File
//!
//! ```toml
//! caller_id = "/rosservice"
//! master_uri = "http://localhost:11311/"
//! namespace = "/"
//! schema_paths = ["/opt/ros/share"]
//!
//! [probe]
//! connect_timeout_ms = 5000
//! read_timeout_ms = 5000
//! recv_chunk_size = 512
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod header;
pub mod invoker;
pub mod names;
pub mod probe;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod uri;
pub mod value;

pub use builder::{describe_arguments, fill, BuildError, Filled};
pub use config::{ConfigError, ProbeConfig, ToolConfig};
pub use error::{Result, ServiceError};
pub use header::{FrameError, HeaderMap};
pub use invoker::{CallTransport, Invocation, Invoker, TransportError};
pub use probe::ServiceProber;
pub use registry::{Lookup, MasterApi, MasterReply, RegistryClient, ServiceRecord, StatusCode};
pub use resolver::TypeResolver;
pub use schema::{
    LoadedType, Schema, SchemaError, SchemaRegistry, SchemaRegistryBuilder, SchemaSource,
    ServiceSchema,
};
pub use uri::EndpointUri;
pub use value::{FieldValue, MessageInstance};

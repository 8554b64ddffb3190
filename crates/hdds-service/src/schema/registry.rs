// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Explicit type-name -> schema registry.

use super::arena::{FieldDef, FieldKind, MessageId, MessageSchema, Schema, SchemaArena};
use super::parser::{self, FieldDecl};
use super::SchemaError;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Suffix of the request message generated for each service.
pub const REQUEST_SUFFIX: &str = "Request";

/// Suffix of the response message generated for each service.
pub const RESPONSE_SUFFIX: &str = "Response";

const MSG_DIR: &str = "msg";
const SRV_DIR: &str = "srv";
const MSG_EXT: &str = "msg";
const SRV_EXT: &str = "srv";

/// A service type: request and response schemas plus the `.srv` text.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSchema {
    pub type_name: String,
    pub request: Schema,
    pub response: Schema,
    pub text: String,
}

/// Result of loading a type name.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedType {
    /// A service type, carrying its request/response companions.
    Service(ServiceSchema),
    /// A bare message type.
    Message(Schema),
}

/// Lookup of schemas by type name.
pub trait SchemaSource {
    fn load(&self, type_name: &str) -> Option<LoadedType>;
}

impl<S: SchemaSource + ?Sized> SchemaSource for &S {
    fn load(&self, type_name: &str) -> Option<LoadedType> {
        (**self).load(type_name)
    }
}

#[derive(Debug)]
struct PendingMessage {
    name: String,
    text: String,
    fields: Vec<FieldDecl>,
}

#[derive(Debug)]
struct PendingService {
    name: String,
    text: String,
}

/// Collects definitions and links them into a [`SchemaRegistry`].
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    messages: Vec<PendingMessage>,
    services: Vec<PendingService>,
    names: HashSet<String>,
}

impl SchemaRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message definition.
    pub fn add_message(mut self, type_name: &str, text: &str) -> Result<Self, SchemaError> {
        let message = self.prepare(type_name, text)?;
        self.commit(message);
        Ok(self)
    }

    /// Add a service definition, with its `Request` / `Response` messages.
    pub fn add_service(mut self, type_name: &str, text: &str) -> Result<Self, SchemaError> {
        self.push_service(type_name, text)?;
        Ok(self)
    }

    /// Add every `<pkg>/msg/*.msg` and `<pkg>/srv/*.srv` below `root`.
    ///
    /// A definition that cannot be read or parsed is logged and skipped;
    /// only failing to list `root` itself is an error.
    pub fn add_dir<P: AsRef<Path>>(mut self, root: P) -> Result<Self, SchemaError> {
        for pkg_dir in sorted_entries(root.as_ref())? {
            if !pkg_dir.is_dir() {
                continue;
            }
            let Some(package) = file_name(&pkg_dir) else {
                continue;
            };

            for (type_name, text) in read_definitions(&pkg_dir.join(MSG_DIR), &package, MSG_EXT) {
                let added = self.prepare(&type_name, &text).map(|m| self.commit(m));
                if let Err(e) = added {
                    log::warn!("[schema] skipping message {}: {}", type_name, e);
                }
            }
            for (type_name, text) in read_definitions(&pkg_dir.join(SRV_DIR), &package, SRV_EXT) {
                if let Err(e) = self.push_service(&type_name, &text) {
                    log::warn!("[schema] skipping service {}: {}", type_name, e);
                }
            }
        }
        Ok(self)
    }

    /// Register a service and its companions, or nothing at all.
    fn push_service(&mut self, type_name: &str, text: &str) -> Result<(), SchemaError> {
        check_type_name(type_name)?;
        let (request, response) = parser::split_service_text(text);
        let request = self.prepare(&format!("{}{}", type_name, REQUEST_SUFFIX), &request)?;
        let response = self.prepare(&format!("{}{}", type_name, RESPONSE_SUFFIX), &response)?;
        self.commit(request);
        self.commit(response);
        self.services.push(PendingService {
            name: type_name.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    fn prepare(&self, type_name: &str, text: &str) -> Result<PendingMessage, SchemaError> {
        check_type_name(type_name)?;
        if self.names.contains(type_name) {
            return Err(SchemaError::Duplicate(type_name.to_string()));
        }
        Ok(PendingMessage {
            name: type_name.to_string(),
            text: text.to_string(),
            fields: parser::parse_definition(type_name, text)?,
        })
    }

    fn commit(&mut self, message: PendingMessage) {
        self.names.insert(message.name.clone());
        self.messages.push(message);
    }

    /// Link type references and freeze the registry.
    ///
    /// Any unknown type reference or self-containing message fails the
    /// whole build. See [`build_partial`](Self::build_partial) for the
    /// lenient variant used when scanning directories.
    pub fn build(self) -> Result<SchemaRegistry, SchemaError> {
        let kept: Vec<&PendingMessage> = self.messages.iter().collect();
        let (arena, by_name) = link(&kept)?;
        check_acyclic(&arena)?;
        Ok(Self::freeze(arena, by_name, self.services))
    }

    /// Link what can be linked.
    ///
    /// Messages referencing a missing type (directly or through another
    /// dropped message) and self-containing messages are logged and left
    /// out, as are services whose request or response was left out.
    pub fn build_partial(self) -> SchemaRegistry {
        let mut dropped: HashSet<String> = HashSet::new();
        loop {
            drop_unresolved(&self.messages, &mut dropped);
            let kept: Vec<&PendingMessage> = self
                .messages
                .iter()
                .filter(|m| !dropped.contains(&m.name))
                .collect();

            // Every reference of a kept message is kept, so linking succeeds.
            let linked = link(&kept).and_then(|(arena, by_name)| {
                check_acyclic(&arena)?;
                Ok((arena, by_name))
            });
            match linked {
                Ok((arena, by_name)) => {
                    let services = self
                        .services
                        .into_iter()
                        .filter(|s| {
                            let complete = [REQUEST_SUFFIX, RESPONSE_SUFFIX]
                                .iter()
                                .all(|suffix| by_name.contains_key(&format!("{}{}", s.name, suffix)));
                            if !complete {
                                log::warn!("[schema] skipping service {}: incomplete definition", s.name);
                            }
                            complete
                        })
                        .collect();
                    return Self::freeze(arena, by_name, services);
                }
                Err(SchemaError::RecursiveType(name)) => {
                    log::warn!("[schema] skipping message {}: contains itself", name);
                    dropped.insert(name);
                }
                Err(e) => {
                    // Not reached once unresolved references are dropped.
                    log::warn!("[schema] link failed: {}", e);
                    return SchemaRegistry::empty();
                }
            }
        }
    }

    fn freeze(
        arena: SchemaArena,
        by_name: HashMap<String, MessageId>,
        pending: Vec<PendingService>,
    ) -> SchemaRegistry {
        let mut services = HashMap::with_capacity(pending.len());
        for service in pending {
            let companion = |suffix: &str| by_name.get(&format!("{}{}", service.name, suffix)).copied();
            // add_service registers both companions with the service.
            if let (Some(request), Some(response)) = (companion(REQUEST_SUFFIX), companion(RESPONSE_SUFFIX)) {
                let entry = ServiceEntry {
                    request,
                    response,
                    text: service.text,
                };
                services.insert(service.name, entry);
            }
        }

        log::debug!(
            "[schema] registry built: {} messages, {} services",
            arena.len(),
            services.len()
        );

        SchemaRegistry {
            arena: Arc::new(arena),
            by_name,
            services,
        }
    }
}

/// Mark messages whose nested references cannot be satisfied.
fn drop_unresolved(messages: &[PendingMessage], dropped: &mut HashSet<String>) {
    loop {
        let available: HashSet<&str> = messages
            .iter()
            .filter(|m| !dropped.contains(&m.name))
            .map(|m| m.name.as_str())
            .collect();

        let unresolved: Vec<(String, String)> = messages
            .iter()
            .filter(|m| available.contains(m.name.as_str()))
            .filter_map(|m| {
                m.fields
                    .iter()
                    .find(|d| !d.is_scalar() && !available.contains(d.base_type.as_str()))
                    .map(|d| (m.name.clone(), d.base_type.clone()))
            })
            .collect();

        if unresolved.is_empty() {
            return;
        }
        for (name, missing) in unresolved {
            log::warn!("[schema] skipping message {}: unknown type {}", name, missing);
            dropped.insert(name);
        }
    }
}

/// Build an arena from `messages`, resolving nested references by name.
fn link(messages: &[&PendingMessage]) -> Result<(SchemaArena, HashMap<String, MessageId>), SchemaError> {
    let by_name: HashMap<String, MessageId> = messages
        .iter()
        .enumerate()
        .map(|(i, m)| (m.name.clone(), MessageId(i)))
        .collect();

    let mut arena = SchemaArena::new();
    for pending in messages {
        let mut fields = Vec::with_capacity(pending.fields.len());
        for decl in &pending.fields {
            if decl.is_scalar() {
                fields.push(FieldDef::scalar(&decl.name, decl.type_string()));
                continue;
            }
            let id = by_name
                .get(&decl.base_type)
                .copied()
                .ok_or_else(|| SchemaError::UnknownType {
                    type_name: pending.name.clone(),
                    field: decl.name.clone(),
                    missing: decl.base_type.clone(),
                })?;
            fields.push(FieldDef::nested(&decl.name, id));
        }
        arena.push(MessageSchema {
            name: pending.name.clone(),
            fields,
            text: pending.text.clone(),
        });
    }
    Ok((arena, by_name))
}

fn check_type_name(type_name: &str) -> Result<(), SchemaError> {
    let valid = match type_name.split_once('/') {
        Some((pkg, ty)) => parser::is_identifier(pkg) && parser::is_identifier(ty),
        None => parser::is_identifier(type_name),
    };
    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidName(type_name.to_string()))
    }
}

/// Reject messages that embed themselves through non-array fields.
fn check_acyclic(arena: &SchemaArena) -> Result<(), SchemaError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Active,
        Done,
    }

    fn visit(arena: &SchemaArena, id: MessageId, marks: &mut [Mark]) -> Result<(), SchemaError> {
        match marks[id.0] {
            Mark::Done => return Ok(()),
            Mark::Active => return Err(SchemaError::RecursiveType(arena.get(id).name.clone())),
            Mark::New => {}
        }
        marks[id.0] = Mark::Active;
        for field in &arena.get(id).fields {
            if let FieldKind::Nested(child) = field.kind {
                visit(arena, child, marks)?;
            }
        }
        marks[id.0] = Mark::Done;
        Ok(())
    }

    let mut marks = vec![Mark::New; arena.len()];
    for (id, _) in arena.iter() {
        visit(arena, id, &mut marks)?;
    }
    Ok(())
}

fn sorted_entries(dir: &Path) -> Result<Vec<std::path::PathBuf>, SchemaError> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();
    Ok(entries)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()?.to_str().map(str::to_string)
}

fn read_definitions(dir: &Path, package: &str, ext: &str) -> Vec<(String, String)> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let entries = match sorted_entries(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("[schema] cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };
    let mut out = Vec::new();
    for path in entries {
        if path.extension().and_then(|e| e.to_str()) != Some(ext) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match fs::read_to_string(&path) {
            Ok(text) => out.push((format!("{}/{}", package, stem), text)),
            Err(e) => log::warn!("[schema] cannot read {}: {}", path.display(), e),
        }
    }
    out
}

#[derive(Debug, Clone)]
struct ServiceEntry {
    request: MessageId,
    response: MessageId,
    text: String,
}

/// Immutable registry of message and service schemas.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    arena: Arc<SchemaArena>,
    by_name: HashMap<String, MessageId>,
    services: HashMap<String, ServiceEntry>,
}

impl SchemaRegistry {
    /// Registry with no definitions.
    pub fn empty() -> Self {
        Self {
            arena: Arc::new(SchemaArena::new()),
            by_name: HashMap::new(),
            services: HashMap::new(),
        }
    }

    /// Load every definition below the given package roots.
    pub fn from_dirs<I, P>(roots: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut builder = SchemaRegistryBuilder::new();
        for root in roots {
            builder = builder.add_dir(root)?;
        }
        Ok(builder.build_partial())
    }

    /// Message schema by type name.
    pub fn message(&self, type_name: &str) -> Option<Schema> {
        self.by_name
            .get(type_name)
            .map(|id| Schema::new(self.arena.clone(), *id))
    }

    /// Service schema by type name.
    pub fn service(&self, type_name: &str) -> Option<ServiceSchema> {
        self.services.get(type_name).map(|entry| ServiceSchema {
            type_name: type_name.to_string(),
            request: Schema::new(self.arena.clone(), entry.request),
            response: Schema::new(self.arena.clone(), entry.response),
            text: entry.text.clone(),
        })
    }

    /// Registered service type names (sorted for determinism).
    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.keys().cloned().collect();
        names.sort();
        names
    }

    /// Registered message type names (sorted for determinism).
    pub fn message_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl SchemaSource for SchemaRegistry {
    fn load(&self, type_name: &str) -> Option<LoadedType> {
        if let Some(service) = self.service(type_name) {
            return Some(LoadedType::Service(service));
        }
        self.message(type_name).map(LoadedType::Message)
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Parser for `.msg` / `.srv` definition text.
//!
//! ```text
//! # comment
//! int32 MODE_FAST=1          <- constant, not a field
//! geometry_msgs/Pose pose    <- nested message
//! float64[] weights          <- array, one scalar leaf
//! ---                        <- request/response separator (.srv only)
//! bool success
//! ```

use super::SchemaError;
use crate::names;

/// Types that are always scalar leaves.
pub const BUILTIN_TYPES: &[&str] = &[
    "bool", "byte", "char", "int8", "uint8", "int16", "uint16", "int32", "uint32", "int64",
    "uint64", "float32", "float64", "string", "time", "duration",
];

/// Package of the implicit `Header` type.
const HEADER_TYPE: &str = "std_msgs/Header";

/// Separator between request and response sections.
const SERVICE_SEPARATOR: &str = "---";

/// One field declaration with its type resolved to a full name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    /// Resolved element type (`int64`, `geometry_msgs/Point`).
    pub base_type: String,
    /// Array suffix as declared (`[]`, `[3]`), if any.
    pub array: Option<String>,
}

impl FieldDecl {
    /// True if the field is filled from a single argument.
    pub fn is_scalar(&self) -> bool {
        self.array.is_some() || is_builtin(&self.base_type)
    }

    /// Declared type with the array suffix, as shown to users.
    pub fn type_string(&self) -> String {
        match &self.array {
            Some(suffix) => format!("{}{}", self.base_type, suffix),
            None => self.base_type.clone(),
        }
    }
}

pub(crate) fn is_builtin(type_name: &str) -> bool {
    BUILTIN_TYPES.contains(&type_name)
}

/// Split `.srv` text into request and response sections.
///
/// Text without a separator is all request.
pub fn split_service_text(text: &str) -> (String, String) {
    let mut request = String::new();
    let mut response = String::new();
    let mut in_response = false;

    for line in text.lines() {
        if !in_response && line.trim() == SERVICE_SEPARATOR {
            in_response = true;
            continue;
        }
        let target = if in_response { &mut response } else { &mut request };
        target.push_str(line);
        target.push('\n');
    }

    (request, response)
}

/// Parse message definition text declared as `type_name`.
///
/// Bare type names resolve inside the package of `type_name`.
pub fn parse_definition(type_name: &str, text: &str) -> Result<Vec<FieldDecl>, SchemaError> {
    let package = names::package_of(type_name);
    let mut fields: Vec<FieldDecl> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let invalid = || SchemaError::InvalidLine {
            type_name: type_name.to_string(),
            line: idx + 1,
            text: raw.to_string(),
        };

        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (ty, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(invalid)?;

        // String constants keep '#' as part of their value.
        let uncommented = rest.split('#').next().unwrap_or("");
        let is_constant = if ty == "string" {
            rest.contains('=')
        } else {
            uncommented.contains('=')
        };
        if is_constant {
            continue;
        }

        let name = uncommented.trim();
        if !is_identifier(name) {
            return Err(invalid());
        }
        if fields.iter().any(|f| f.name == name) {
            return Err(invalid());
        }

        let (base, array) = split_array(ty).ok_or_else(invalid)?;
        fields.push(FieldDecl {
            name: name.to_string(),
            base_type: resolve_type(base, package).ok_or_else(invalid)?,
            array,
        });
    }

    Ok(fields)
}

fn split_array(ty: &str) -> Option<(&str, Option<String>)> {
    match ty.find('[') {
        Some(open) => {
            let suffix = &ty[open..];
            let inner = suffix.strip_prefix('[')?.strip_suffix(']')?;
            if !inner.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            Some((&ty[..open], Some(suffix.to_string())))
        }
        None => Some((ty, None)),
    }
}

fn resolve_type(base: &str, package: &str) -> Option<String> {
    if is_builtin(base) {
        return Some(base.to_string());
    }
    if base == "Header" {
        return Some(HEADER_TYPE.to_string());
    }
    if base.contains('/') {
        let (pkg, ty) = base.split_once('/')?;
        return (is_identifier(pkg) && is_identifier(ty)).then(|| base.to_string());
    }
    if !is_identifier(base) {
        return None;
    }
    if package.is_empty() {
        Some(base.to_string())
    } else {
        Some(format!("{}/{}", package, base))
    }
}

pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Graph and resource name helpers.

/// Separator between namespace components.
pub const SEP: char = '/';

/// Prefix marking a private (caller-relative) name.
pub const PRIVATE_PREFIX: char = '~';

/// Collapse repeated separators and strip a trailing one.
///
/// The root namespace stays `/`.
pub fn canonicalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_sep = false;
    for c in name.chars() {
        if c == SEP {
            if !prev_sep {
                out.push(c);
            }
            prev_sep = true;
        } else {
            out.push(c);
            prev_sep = false;
        }
    }
    if out.len() > 1 && out.ends_with(SEP) {
        out.pop();
    }
    out
}

/// Resolve a user-supplied name to a global graph name.
///
/// - `/a/b` is already global.
/// - `~a` lives under `caller_id`.
/// - anything else lives under `namespace`.
pub fn resolve_name(name: &str, namespace: &str, caller_id: &str) -> String {
    if name.is_empty() {
        return canonicalize(&global(namespace));
    }
    if name.starts_with(SEP) {
        return canonicalize(name);
    }
    if let Some(private) = name.strip_prefix(PRIVATE_PREFIX) {
        return canonicalize(&format!("{}{}{}", global(caller_id), SEP, private));
    }
    canonicalize(&format!("{}{}{}", global(namespace), SEP, name))
}

fn global(name: &str) -> String {
    if name.starts_with(SEP) {
        name.to_string()
    } else {
        format!("{}{}", SEP, name)
    }
}

/// Package part of a resource name (`pkg/Type` -> `pkg`).
///
/// Returns an empty string for unqualified names.
pub fn package_of(type_name: &str) -> &str {
    match type_name.find(SEP) {
        Some(idx) => &type_name[..idx],
        None => "",
    }
}

/// Base part of a resource name (`pkg/Type` -> `Type`).
pub fn base_of(type_name: &str) -> &str {
    match type_name.rfind(SEP) {
        Some(idx) => &type_name[idx + 1..],
        None => type_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize("/"), "/");
        assert_eq!(canonicalize("//a//b/"), "/a/b");
        assert_eq!(canonicalize("a/b"), "a/b");
    }

    #[test]
    fn test_resolve_global() {
        assert_eq!(resolve_name("/add_two_ints", "/ns", "/caller"), "/add_two_ints");
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve_name("add_two_ints", "/", "/rosservice"), "/add_two_ints");
        assert_eq!(resolve_name("add_two_ints", "/robot/", "/rosservice"), "/robot/add_two_ints");
        assert_eq!(resolve_name("add_two_ints", "robot", "/rosservice"), "/robot/add_two_ints");
    }

    #[test]
    fn test_resolve_private() {
        assert_eq!(resolve_name("~reset", "/robot", "/rosservice"), "/rosservice/reset");
    }

    #[test]
    fn test_resolve_empty_is_namespace() {
        assert_eq!(resolve_name("", "/robot/", "/rosservice"), "/robot");
    }

    #[test]
    fn test_resource_parts() {
        assert_eq!(package_of("rospy_tutorials/AddTwoInts"), "rospy_tutorials");
        assert_eq!(package_of("AddTwoInts"), "");
        assert_eq!(base_of("rospy_tutorials/AddTwoInts"), "AddTwoInts");
        assert_eq!(base_of("AddTwoInts"), "AddTwoInts");
    }
}

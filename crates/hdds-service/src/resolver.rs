// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service type resolution.
//!
//! A service's type is learned by probing its endpoint, then mapped to a
//! local schema through a [`SchemaSource`]. Some peers advertise the request
//! message type (`pkg/FooRequest`) instead of the service type; the resolver
//! retries with the suffix stripped when that happens.

use crate::builder;
use crate::config::ToolConfig;
use crate::error::{Result, ServiceError};
use crate::header::HeaderMap;
use crate::names;
use crate::probe::ServiceProber;
use crate::registry::{Lookup, MasterApi, RegistryClient};
use crate::schema::{LoadedType, SchemaRegistry, SchemaSource, ServiceSchema, REQUEST_SUFFIX};

/// Resolves service names to types and schemas.
pub struct TypeResolver<M, S> {
    registry: RegistryClient<M>,
    prober: ServiceProber,
    schemas: S,
}

impl<M: MasterApi> TypeResolver<M, SchemaRegistry> {
    /// Resolver for `master` with definitions loaded from
    /// `config.schema_paths`.
    pub fn from_config(master: M, config: &ToolConfig) -> Result<Self> {
        config.validate()?;
        let schemas = SchemaRegistry::from_dirs(&config.schema_paths)?;
        log::debug!(
            "[resolver] loaded {} service definitions from {} path(s)",
            schemas.service_names().len(),
            config.schema_paths.len()
        );
        Ok(Self::new(
            RegistryClient::new(master, config.master_uri.clone(), config.caller_id.clone()),
            ServiceProber::new(config.probe.clone(), config.caller_id.clone()),
            schemas,
        ))
    }
}

impl<M: MasterApi, S: SchemaSource> TypeResolver<M, S> {
    pub fn new(registry: RegistryClient<M>, prober: ServiceProber, schemas: S) -> Self {
        Self {
            registry,
            prober,
            schemas,
        }
    }

    pub fn registry(&self) -> &RegistryClient<M> {
        &self.registry
    }

    pub fn prober(&self) -> &ServiceProber {
        &self.prober
    }

    pub fn schemas(&self) -> &S {
        &self.schemas
    }

    /// Probe the headers of `service`.
    ///
    /// Returns `None` when the master does not know the service. An
    /// unanswered probe yields an empty map.
    pub fn service_headers(&self, service: &str) -> Result<Option<HeaderMap>> {
        match self.registry.lookup_service(service)? {
            Lookup::Found(uri) => self.prober.probe(service, &uri).map(Some),
            Lookup::Unknown => {
                log::warn!("Unknown service [{}]", service);
                Ok(None)
            }
        }
    }

    /// Type advertised by `service`, or `None` if it cannot be determined.
    pub fn resolve_service_type(&self, service: &str) -> Result<Option<String>> {
        let service_type = self
            .service_headers(service)?
            .and_then(|headers| headers.service_type().map(str::to_string));
        log::debug!("[resolver] {} has type {:?}", service, service_type);
        Ok(service_type)
    }

    /// Request/response schema of `service`.
    ///
    /// Fails with `ServiceNotFound` when the service is not listed by the
    /// master, `TypeUnresolvable` when it is listed but its type is unknown,
    /// and `SchemaNotLoadable` when no local definition matches the type.
    pub fn resolve_service_schema(&self, service: &str) -> Result<ServiceSchema> {
        let Some(mut service_type) = self.resolve_service_type(service)? else {
            return Err(self.diagnose_unknown(service)?);
        };

        let mut loaded = self.schemas.load(&service_type);
        if let Some(LoadedType::Message(_)) = loaded {
            if let Some(stripped) = service_type.strip_suffix(REQUEST_SUFFIX) {
                let stripped = stripped.to_string();
                log::debug!(
                    "[resolver] {} advertised request type {}, retrying as {}",
                    service,
                    service_type,
                    stripped
                );
                loaded = self.schemas.load(&stripped);
                service_type = stripped;
            }
        }

        match loaded {
            Some(LoadedType::Service(schema)) => Ok(schema),
            _ => Err(ServiceError::SchemaNotLoadable {
                package: names::package_of(&service_type).to_string(),
                type_name: service_type,
            }),
        }
    }

    /// Space-separated request field paths of `service`.
    pub fn describe_service_args(&self, service: &str) -> Result<String> {
        let schema = self.resolve_service_schema(service)?;
        Ok(builder::describe_arguments(&schema.request))
    }

    fn diagnose_unknown(&self, service: &str) -> Result<ServiceError> {
        let listed = self.registry.service_names(None)?;
        if listed.iter().any(|name| name == service) {
            Ok(ServiceError::TypeUnresolvable(service.to_string()))
        } else {
            Ok(ServiceError::ServiceNotFound(service.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeConfig;
    use crate::registry::{MasterReply, ServiceProviders};
    use crate::schema::SchemaRegistryBuilder;
    use std::io;

    /// Master that knows no services and lists `listed`.
    struct EmptyMaster {
        listed: Vec<ServiceProviders>,
        lookup_code: i32,
    }

    impl MasterApi for EmptyMaster {
        fn lookup_service(&self, _caller_id: &str, service: &str) -> io::Result<MasterReply<String>> {
            Ok(MasterReply::new(
                self.lookup_code,
                format!("no provider for [{}]", service),
                String::new(),
            ))
        }

        fn system_services(&self, _caller_id: &str) -> io::Result<MasterReply<Vec<ServiceProviders>>> {
            Ok(MasterReply::new(1, "services", self.listed.clone()))
        }
    }

    fn resolver(master: EmptyMaster, schemas: SchemaRegistry) -> TypeResolver<EmptyMaster, SchemaRegistry> {
        TypeResolver::new(
            RegistryClient::new(master, "http://localhost:11311/", "/rosservice"),
            ServiceProber::new(ProbeConfig::default(), "/rosservice"),
            schemas,
        )
    }

    #[test]
    fn test_unknown_service_type_is_none() {
        let r = resolver(
            EmptyMaster {
                listed: Vec::new(),
                lookup_code: -1,
            },
            SchemaRegistry::empty(),
        );
        assert_eq!(r.resolve_service_type("/missing").unwrap(), None);
        assert!(r.service_headers("/missing").unwrap().is_none());
    }

    #[test]
    fn test_master_error_propagates() {
        let r = resolver(
            EmptyMaster {
                listed: Vec::new(),
                lookup_code: 0,
            },
            SchemaRegistry::empty(),
        );
        assert!(matches!(
            r.resolve_service_type("/x"),
            Err(ServiceError::RegistryUnavailable { code: 0, .. })
        ));
    }

    #[test]
    fn test_diagnose_not_listed() {
        let r = resolver(
            EmptyMaster {
                listed: vec![("/other".into(), vec!["/node".into()])],
                lookup_code: -1,
            },
            SchemaRegistry::empty(),
        );
        assert!(matches!(
            r.resolve_service_schema("/missing"),
            Err(ServiceError::ServiceNotFound(name)) if name == "/missing"
        ));
    }

    #[test]
    fn test_from_config_loads_definitions() {
        let root = tempfile::tempdir().unwrap();
        let srv_dir = root.path().join("rospy_tutorials").join("srv");
        std::fs::create_dir_all(&srv_dir).unwrap();
        std::fs::write(srv_dir.join("AddTwoInts.srv"), "int64 a\nint64 b\n---\nint64 sum\n").unwrap();
        let broken_dir = root.path().join("nav_msgs").join("srv");
        std::fs::create_dir_all(&broken_dir).unwrap();
        std::fs::write(broken_dir.join("GetPlan.srv"), "geometry_msgs/PoseStamped start\n---\n").unwrap();

        let config = ToolConfig {
            schema_paths: vec![root.path().to_path_buf()],
            ..ToolConfig::default()
        };
        let master = EmptyMaster {
            listed: Vec::new(),
            lookup_code: -1,
        };
        let r = TypeResolver::from_config(master, &config).unwrap();
        assert!(r.schemas().service("rospy_tutorials/AddTwoInts").is_some());
        assert!(r.schemas().service("nav_msgs/GetPlan").is_none());
        assert_eq!(r.registry().caller_id(), "/rosservice");
    }

    #[test]
    fn test_diagnose_listed_but_untyped() {
        // Listed by the master, but its lookup fails (e.g. the provider is
        // shutting down), so no type can be determined.
        let r = resolver(
            EmptyMaster {
                listed: vec![("/flaky".into(), vec!["/node".into()])],
                lookup_code: -1,
            },
            SchemaRegistryBuilder::new().build().unwrap(),
        );
        assert!(matches!(
            r.resolve_service_schema("/flaky"),
            Err(ServiceError::TypeUnresolvable(name)) if name == "/flaky"
        ));
        assert!(r.describe_service_args("/flaky").is_err());
    }
}

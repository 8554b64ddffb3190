// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared fixtures: in-memory master, loopback service peers, a recording
//! call transport and a capturing logger.

#![allow(dead_code)]

use hdds_service::header::{self, HeaderMap};
use hdds_service::probe::read_frame;
use hdds_service::registry::ServiceProviders;
use hdds_service::{
    CallTransport, EndpointUri, FieldValue, MasterApi, MasterReply, MessageInstance, ProbeConfig,
    RegistryClient, SchemaRegistry, SchemaRegistryBuilder, ServiceProber, ServiceSchema,
    TransportError, TypeResolver,
};
use std::collections::HashMap;
use std::io::{self, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Mutex, Once};
use std::thread::{self, JoinHandle};

pub const CALLER_ID: &str = "/rosservice";

pub const ADD_TWO_INTS_SRV: &str = "int64 a\nint64 b\n---\nint64 sum\n";

/// In-memory master.
#[derive(Default)]
pub struct FakeMaster {
    uris: HashMap<String, String>,
    providers: Vec<ServiceProviders>,
    malfunction: Option<String>,
}

impl FakeMaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `service` at `uri`, provided by `node`.
    pub fn with_service(mut self, service: &str, uri: &EndpointUri, node: &str) -> Self {
        self.uris.insert(service.to_string(), uri.to_string());
        self.providers
            .push((service.to_string(), vec![node.to_string()]));
        self
    }

    /// List `service` without a resolvable endpoint.
    pub fn with_listed_only(mut self, service: &str, node: &str) -> Self {
        self.providers
            .push((service.to_string(), vec![node.to_string()]));
        self
    }

    /// Answer every call with an error status.
    pub fn malfunctioning(mut self, message: &str) -> Self {
        self.malfunction = Some(message.to_string());
        self
    }
}

impl MasterApi for FakeMaster {
    fn lookup_service(&self, _caller_id: &str, service: &str) -> io::Result<MasterReply<String>> {
        if let Some(msg) = &self.malfunction {
            return Ok(MasterReply::new(0, msg.clone(), String::new()));
        }
        Ok(match self.uris.get(service) {
            Some(uri) => MasterReply::new(1, "rosrpc URI", uri.clone()),
            None => MasterReply::new(-1, format!("no provider for [{}]", service), String::new()),
        })
    }

    fn system_services(&self, _caller_id: &str) -> io::Result<MasterReply<Vec<ServiceProviders>>> {
        if let Some(msg) = &self.malfunction {
            return Ok(MasterReply::new(0, msg.clone(), Vec::new()));
        }
        Ok(MasterReply::new(1, "current system state", self.providers.clone()))
    }
}

/// Loopback peer answering one probe with `fields`, then closing.
///
/// The handle yields the probe header the peer received.
pub fn serve_header(fields: &[(&str, &str)]) -> (EndpointUri, JoinHandle<HeaderMap>) {
    let reply = header::encode_frame(fields.iter().copied());
    serve_raw(reply)
}

/// Loopback peer answering one probe with raw bytes, then closing.
pub fn serve_raw(reply: Vec<u8>) -> (EndpointUri, JoinHandle<HeaderMap>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = EndpointUri::from(listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let probe = receive_probe(&mut stream);
        stream.write_all(&reply).unwrap();
        probe
    });
    (uri, handle)
}

fn receive_probe(stream: &mut TcpStream) -> HeaderMap {
    let acc = read_frame(stream, &ProbeConfig::default()).unwrap();
    header::parse_fields(&acc.finish().unwrap())
}

/// Schemas for the services used across the scenarios.
pub fn schemas() -> SchemaRegistry {
    SchemaRegistryBuilder::new()
        .add_service("rospy_tutorials/AddTwoInts", ADD_TWO_INTS_SRV)
        .unwrap()
        .add_message("demo/Point2", "float64 x\nfloat64 y\n")
        .unwrap()
        .add_service("demo/SetPose", "Point2 pose\nstring name\n---\nbool ok\n")
        .unwrap()
        .build()
        .unwrap()
}

pub fn resolver(master: FakeMaster) -> TypeResolver<FakeMaster, SchemaRegistry> {
    TypeResolver::new(
        RegistryClient::new(master, "http://localhost:11311/", CALLER_ID),
        ServiceProber::new(ProbeConfig::default(), CALLER_ID),
        schemas(),
    )
}

/// Transport that records requests and answers from a handler.
pub struct RecordingTransport<F> {
    pub calls: Vec<(String, MessageInstance)>,
    handler: F,
}

impl<F> RecordingTransport<F>
where
    F: FnMut(&ServiceSchema, &MessageInstance) -> Result<MessageInstance, TransportError>,
{
    pub fn new(handler: F) -> Self {
        Self {
            calls: Vec::new(),
            handler,
        }
    }
}

impl<F> CallTransport for RecordingTransport<F>
where
    F: FnMut(&ServiceSchema, &MessageInstance) -> Result<MessageInstance, TransportError>,
{
    fn call(
        &mut self,
        service: &str,
        schema: &ServiceSchema,
        request: &MessageInstance,
    ) -> Result<MessageInstance, TransportError> {
        self.calls.push((service.to_string(), request.clone()));
        (self.handler)(schema, request)
    }
}

/// Adds two int64 fields, rejecting anything else like a real serializer.
pub fn add_two_ints(
    schema: &ServiceSchema,
    request: &MessageInstance,
) -> Result<MessageInstance, TransportError> {
    let mut sum = 0;
    for field in ["a", "b"] {
        match request.get(field) {
            Some(FieldValue::Int(v)) => sum += v,
            Some(other) => {
                return Err(TransportError::Serialization(format!(
                    "field {} must be int64, got {}",
                    field,
                    other.kind_name()
                )))
            }
            None => return Err(TransportError::Remote(format!("missing field {}", field))),
        }
    }
    Ok(MessageInstance::new(schema.response.name()).with_field("sum", sum))
}

/// Logger keeping every formatted record.
pub struct CapturingLogger {
    records: Mutex<Vec<String>>,
}

impl log::Log for CapturingLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push(format!("{} {}", record.level(), record.args()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    records: Mutex::new(Vec::new()),
};
static INIT: Once = Once::new();

/// Install the capturing logger (once per test binary).
pub fn capture_logs() -> &'static CapturingLogger {
    INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(log::LevelFilter::Trace);
    });
    &LOGGER
}

impl CapturingLogger {
    /// True if any record contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.records
            .lock()
            .map(|records| records.iter().any(|r| r.contains(needle)))
            .unwrap_or(false)
    }
}

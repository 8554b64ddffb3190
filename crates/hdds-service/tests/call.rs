// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Service call integration tests: resolve, fill, then hand the request to a
//! recording transport.

mod common;

use common::{
    add_two_ints, resolver, serve_header, FakeMaster, RecordingTransport, ADD_TWO_INTS_SRV,
};
use hdds_service::{
    FieldValue, Invoker, MessageInstance, SchemaRegistry, ServiceError, ServiceSchema,
    TransportError,
};

type Handler = fn(&ServiceSchema, &MessageInstance) -> Result<MessageInstance, TransportError>;

fn add_two_ints_invoker() -> Invoker<FakeMaster, SchemaRegistry, RecordingTransport<Handler>> {
    let (uri, _peer) = serve_header(&[("type", "rospy_tutorials/AddTwoInts"), ("md5sum", "abc")]);
    let handler: Handler = add_two_ints;
    Invoker::new(
        resolver(FakeMaster::new().with_service("/add_two_ints", &uri, "/adder")),
        RecordingTransport::new(handler),
    )
}

#[test]
fn call_fills_and_sends_request() {
    let mut invoker = add_two_ints_invoker();

    let call = invoker
        .call("/add_two_ints", vec![FieldValue::from(1), FieldValue::from(2)])
        .unwrap();
    assert_eq!(call.request.get("a"), Some(&FieldValue::Int(1)));
    assert_eq!(call.request.get("b"), Some(&FieldValue::Int(2)));
    assert_eq!(call.response.get("sum"), Some(&FieldValue::Int(3)));
    assert_eq!(call.render(false), "sum: 3");
    assert_eq!(call.render(true), "a: 1\nb: 2\n---\nsum: 3");

    let calls = &invoker.transport().calls;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "/add_two_ints");
    assert_eq!(calls[0].1.type_name(), "rospy_tutorials/AddTwoIntsRequest");
}

#[test]
fn extra_arguments_are_ignored() {
    let mut invoker = add_two_ints_invoker();

    let call = invoker
        .call("/add_two_ints", vec![4.into(), 5.into(), "surplus".into()])
        .unwrap();
    assert_eq!(call.response.get("sum"), Some(&FieldValue::Int(9)));
    assert_eq!(call.request.len(), 2);
}

#[test]
fn too_few_arguments_never_reach_transport() {
    let mut invoker = add_two_ints_invoker();

    let err = invoker.call("/add_two_ints", vec![1.into()]).unwrap_err();
    match &err {
        ServiceError::ArgumentCountMismatch { expected } => assert_eq!(expected, &["a", "b"]),
        other => panic!("expected ArgumentCountMismatch, got {:?}", other),
    }
    assert_eq!(err.to_string(), "Not enough arguments to call service.\nArgs are: [a b]");
    assert!(invoker.transport().calls.is_empty());
}

#[test]
fn serialization_failure_includes_srv_text() {
    let mut invoker = add_two_ints_invoker();

    let err = invoker
        .call("/add_two_ints", vec!["one".into(), 2.into()])
        .unwrap_err();
    match &err {
        ServiceError::SerializationMismatch { detail, srv_text } => {
            assert_eq!(detail, "field a must be int64, got string");
            assert_eq!(srv_text, ADD_TWO_INTS_SRV);
        }
        other => panic!("expected SerializationMismatch, got {:?}", other),
    }
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn nested_request_consumes_depth_first() {
    let (uri, _peer) = serve_header(&[("type", "demo/SetPose")]);
    let transport = RecordingTransport::new(|schema: &ServiceSchema, _req: &MessageInstance| {
        Ok(MessageInstance::new(schema.response.name()).with_field("ok", true))
    });
    let mut invoker = Invoker::new(
        resolver(FakeMaster::new().with_service("/set_pose", &uri, "/ctrl")),
        transport,
    );

    let call = invoker
        .call("/set_pose", vec![1.into(), 2.into(), "foo".into()])
        .unwrap();
    assert_eq!(call.request.get_path("pose.x"), Some(&FieldValue::Int(1)));
    assert_eq!(call.request.get_path("pose.y"), Some(&FieldValue::Int(2)));
    assert_eq!(call.request.get("name"), Some(&FieldValue::from("foo")));
    assert_eq!(call.render(true), "pose:\n  x: 1\n  y: 2\nname: foo\n---\nok: true");
}

#[test]
fn remote_failure_is_call_failed() {
    let (uri, _peer) = serve_header(&[("type", "rospy_tutorials/AddTwoInts")]);
    let transport = RecordingTransport::new(|_: &ServiceSchema, _: &MessageInstance| {
        Err(TransportError::Remote("service handler raised".into()))
    });
    let mut invoker = Invoker::new(
        resolver(FakeMaster::new().with_service("/add_two_ints", &uri, "/adder")),
        transport,
    );

    let err = invoker
        .call("/add_two_ints", vec![1.into(), 2.into()])
        .unwrap_err();
    assert!(matches!(err, ServiceError::CallFailed(ref m) if m == "service handler raised"));
}

#[test]
fn call_on_unknown_service() {
    let mut invoker = Invoker::new(
        resolver(FakeMaster::new()),
        RecordingTransport::new(add_two_ints),
    );

    let err = invoker.call("/missing", vec![1.into(), 2.into()]).unwrap_err();
    assert!(matches!(err, ServiceError::ServiceNotFound(_)));
    assert!(invoker.transport().calls.is_empty());
}

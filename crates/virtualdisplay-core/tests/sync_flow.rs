// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! End-to-end selection, delivery and reconciliation through the client.
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{client, color_mapping, hide, show, state};
use serde_json::json;
use virtualdisplay_core::proto::Message;
use virtualdisplay_core::{AttributeConfig, AttributeValueConfig, ErrorCode, MappingConfiguration};

#[test]
fn nothing_is_sent_before_ready_then_everything_in_order() {
    let (client, port) = client();
    client.set_mapping(color_mapping()).unwrap();
    client
        .get_attribute("Color")
        .unwrap()
        .select("Blue")
        .unwrap();
    client.camera().rotate(30.0).set();
    assert!(port.sent().is_empty());

    client.notify_ready();
    let types: Vec<_> = port.sent().iter().map(Message::type_name).collect();
    assert_eq!(types, vec!["mutation", "mutation", "camera"]);
    assert_eq!(
        port.mutation_batches(),
        vec![
            vec![show("r1"), show("r2"), hide("b1")],
            vec![hide("r1"), hide("r2"), show("b1")],
        ]
    );
}

#[test]
fn initial_config_follows_the_flushed_queue() {
    let mut options = virtualdisplay_core::ClientOptions::new("chair", "l");
    options.ar_enabled = Some(false);
    let client = virtualdisplay_core::VirtualdisplayClient::new(options);
    let port = Rc::new(common::RecordingPort::default());
    client.attach_port(port.clone());
    client.set_mapping(color_mapping()).unwrap();
    client.notify_ready();
    client.notify_ready();
    let types: Vec<_> = port.sent().iter().map(Message::type_name).collect();
    assert_eq!(types, vec!["mutation", "config"]);
}

#[test]
fn viewer_report_drives_attribute_state_and_callbacks() {
    let (client, _port) = client();
    client.notify_ready();
    client.set_mapping(color_mapping()).unwrap();
    let color = client.get_attribute("Color").unwrap();
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    color.on_change(move || h.set(h.get() + 1));

    client.receive(&state(&[("r1", false), ("r2", false), ("b1", true)], true));
    assert_eq!(color.current_value().as_deref(), Some("Blue"));
    assert_eq!(hits.get(), 2);

    // same state again still notifies every value
    client.receive(&state(&[("r1", false), ("r2", false), ("b1", true)], false));
    assert_eq!(hits.get(), 4);
}

#[test]
fn selecting_back_after_viewer_switch_reaches_the_viewer() {
    let (client, port) = client();
    client.notify_ready();
    client.set_mapping(color_mapping()).unwrap();
    client.receive(&state(&[("r1", false), ("r2", false), ("b1", true)], true));
    port.clear();

    let color = client.get_attribute("Color").unwrap();
    color.select("Red").unwrap();
    assert_eq!(
        port.mutation_batches(),
        vec![vec![hide("b1"), show("r1"), show("r2")]]
    );
    assert_eq!(color.current_value().as_deref(), Some("Red"));
}

#[test]
fn initial_report_keeps_optimistic_node_state() {
    let (client, _port) = client();
    client.receive(&state(&[("n1", true)], false));
    client.receive(&state(&[("n1", false), ("n2", true)], true));
    assert!(client.get_node("n1").unwrap().is_visible());
    assert!(client.get_node("n2").unwrap().is_visible());

    client.receive(&state(&[("n1", false)], false));
    assert!(!client.get_node("n1").unwrap().is_visible());
}

#[test]
fn unrecognized_inbound_traffic_is_dropped() {
    let (client, _port) = client();
    assert!(!client.receive(&json!({"source": "react-devtools"})));
    assert!(!client.receive(&json!({"type": "state", "nodes": "n1"})));
    assert!(!client.receive(&json!({
        "type": "state",
        "nodes": [{"id": "n1", "name": "N", "type": "light", "visible": true}]
    })));
    assert!(client.get_nodes().is_empty());
}

#[test]
fn empty_mapping_is_rejected_and_single_attribute_emits_defaults() {
    let (client, port) = client();
    client.notify_ready();
    let err = client
        .set_mapping(MappingConfiguration::new(vec![]))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidMapping);
    assert!(port.sent().is_empty());

    client
        .set_mapping(MappingConfiguration::new(vec![AttributeConfig::new(
            "Size",
            vec![
                AttributeValueConfig::new("S", ["s"]),
                AttributeValueConfig::new("L", ["l"]).selected(),
            ],
        )]))
        .unwrap();
    assert_eq!(port.mutation_batches(), vec![vec![hide("s"), show("l")]]);
}

#[test]
fn node_selector_toggles_against_reported_state() {
    let (client, port) = client();
    client.notify_ready();
    client.receive(&state(&[("n1", true)], true));
    let node = client.node_selector("n1").unwrap();
    node.toggle();
    assert_eq!(port.mutation_batches(), vec![vec![hide("n1")]]);
}

#[test]
fn snapshot_round_trip_through_the_transport() {
    let (client, port) = client();
    client.notify_ready();
    let photo = client.snapshot().take("front.PNG").unwrap();
    assert_eq!(
        port.sent(),
        vec![Message::Snapshot {
            filename: "front.PNG".into(),
            data: None
        }]
    );
    client.receive(&json!({"type": "snapshot", "filename": "front.PNG", "data": "iVBOR"}));
    assert_eq!(photo.data().map(|d| d.data).as_deref(), Some("iVBOR"));
}

#[test]
fn destroy_drops_queue_and_state() {
    let (client, port) = client();
    client.set_mapping(color_mapping()).unwrap();
    client.receive(&state(&[("r1", true)], true));
    client.destroy();
    client.notify_ready();
    assert!(port.sent().is_empty());
    assert!(client.get_nodes().is_empty());
    assert_eq!(
        client.get_attribute("Color").unwrap_err().code(),
        ErrorCode::NoMapping
    );
}

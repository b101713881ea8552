// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Property tests for selection invariants and delivery order.
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{client, hide, show};
use proptest::prelude::*;
use virtualdisplay_core::proto::MutationKind;
use virtualdisplay_core::{
    AttributeConfig, AttributeValueConfig, EventBus, MappingConfiguration, Mutation,
};

fn mapping(attributes: usize, values: usize) -> MappingConfiguration {
    MappingConfiguration::new(
        (0..attributes)
            .map(|a| {
                AttributeConfig::new(
                    format!("a{a}"),
                    (0..values)
                        .map(|v| {
                            let value =
                                AttributeValueConfig::new(format!("v{v}"), [format!("n{a}_{v}")]);
                            if v == 0 {
                                value.selected()
                            } else {
                                value
                            }
                        })
                        .collect(),
                )
            })
            .collect(),
    )
}

proptest! {
    #[test]
    fn at_most_one_value_selected_per_attribute(
        picks in prop::collection::vec((0usize..3, 0usize..5), 0..32),
    ) {
        let (client, _port) = client();
        client.set_mapping(mapping(3, 4)).unwrap();
        for (a, v) in picks {
            client.attributes().select_attribute_value(&format!("a{a}"), &format!("v{v}"));
            for attribute in client.attributes().get_all_attributes() {
                prop_assert!(attribute.values().filter(|x| x.is_selected()).count() <= 1);
            }
        }
    }

    #[test]
    fn queued_messages_are_delivered_once_in_order(
        ids in prop::collection::vec("[a-z]{1,6}", 0..24),
        split in 0usize..24,
    ) {
        let (client, port) = client();
        let split = split.min(ids.len());
        for id in &ids[..split] {
            client.send_mutations(&[Mutation::show(id.as_str())]);
        }
        prop_assert!(port.sent().is_empty());
        client.notify_ready();
        for id in &ids[split..] {
            client.send_mutations(&[Mutation::hide(id.as_str())]);
        }
        let expected: Vec<_> = ids[..split]
            .iter()
            .map(|id| vec![show(id)])
            .chain(ids[split..].iter().map(|id| vec![hide(id)]))
            .collect();
        prop_assert_eq!(port.mutation_batches(), expected);
    }

    #[test]
    fn select_and_back_restores_defaults(target in 1usize..4) {
        let (client, port) = client();
        client.notify_ready();
        client.set_mapping(mapping(1, 4)).unwrap();
        let defaults = client.attributes().get_attribute("a0").unwrap().default_mutations();
        let color = client.get_attribute("a0").unwrap();
        color.select(&format!("v{target}")).unwrap();
        color.select("v0").unwrap();
        prop_assert_eq!(
            client.attributes().get_attribute("a0").unwrap().default_mutations(),
            defaults
        );
        // the two transitions cancel out
        let batches = port.mutation_batches();
        prop_assert_eq!(batches.len(), 3);
        let key = |(kind, id): &(MutationKind, String)| (kind.as_str(), id.clone());
        let mut forward: Vec<_> = batches[1]
            .iter()
            .map(|(k, id)| key(&(k.inverse(), id.clone())))
            .collect();
        let mut back: Vec<_> = batches[2].iter().map(key).collect();
        forward.sort();
        back.sort();
        prop_assert_eq!(back, forward);
    }
}

#[test]
fn foreign_bus_ready_signal_does_not_flush_the_client() {
    let a = EventBus::new();
    let b = EventBus::new();
    let (client, port) = client();
    client.send_mutations(&[Mutation::show("n1")]);
    a.emit(&virtualdisplay_core::DomainEvent::IframeReady);
    b.emit(&virtualdisplay_core::DomainEvent::IframeReady);
    assert!(port.sent().is_empty());
}

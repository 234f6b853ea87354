//! Property tests for child ordering and text composition.

use proptest::prelude::*;

use spark_mu::host::{HostConfig, InstanceHost, Node, NodeId};
use spark_mu::{label, Element, Props, Reconciler};

#[derive(Debug, Clone)]
enum Op {
    Append(usize),
    InsertBefore(usize, usize),
    Remove(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..8usize).prop_map(Op::Append),
        (0..8usize, 0..8usize).prop_map(|(a, b)| Op::InsertBefore(a, b)),
        (0..8usize).prop_map(Op::Remove),
    ]
}

/// Text composition as a tree of leaves: a leaf string or a nested list.
fn text_tree() -> impl Strategy<Value = Element> {
    let leaf = "[a-z ]{0,4}".prop_map(Element::Text);
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(|children| Element::new("text").children(children))
    })
}

fn expected_text(element: &Element) -> String {
    match element {
        Element::Text(t) => t.clone(),
        Element::Node(desc) => desc.children.iter().map(expected_text).collect(),
        Element::Fragment(items) => items.iter().map(expected_text).collect(),
    }
}

proptest! {
    #[test]
    fn prop_child_order_matches_operations(ops in prop::collection::vec(op(), 0..40)) {
        let mut host = InstanceHost::new();
        let parent = host.create_instance("column", &Props::new());
        host.append_child_to_container(parent).unwrap();

        // Model: the ordered list of live child handles.
        let mut model: Vec<NodeId> = Vec::new();
        for op in ops {
            match op {
                Op::Append(_) => {
                    let child = host.create_instance("label", &Props::new());
                    host.append_child(parent, child).unwrap();
                    model.push(child);
                }
                Op::InsertBefore(_, at) if !model.is_empty() => {
                    let before = model[at % model.len()];
                    let child = host.create_instance("label", &Props::new());
                    host.insert_before(parent, child, before).unwrap();
                    let pos = model.iter().position(|c| *c == before).unwrap();
                    model.insert(pos, child);
                }
                Op::Remove(at) if !model.is_empty() => {
                    let child = model.remove(at % model.len());
                    host.remove_child(parent, child).unwrap();
                }
                _ => {}
            }
            prop_assert_eq!(host.children(parent).unwrap(), model.as_slice());
        }
        prop_assert_eq!(host.node_count(), model.len() + 2);
    }

    #[test]
    fn prop_text_composition_is_depth_first(tree in text_tree()) {
        let root = Element::new("label").child(tree.clone());
        let mut host = InstanceHost::new();
        let mut reconciler = Reconciler::new();
        reconciler.commit(&mut host, root).unwrap();
        let id = reconciler.root_nodes()[0];

        let composed = host.text_content(id).unwrap();
        prop_assert_eq!(&composed, &expected_text(&tree));

        // Composition of a node equals the concatenation of its children's.
        let by_children: String = host
            .children(id)
            .unwrap()
            .iter()
            .map(|c| host.text_content(*c).unwrap())
            .collect();
        prop_assert_eq!(composed, by_children);
    }

    #[test]
    fn prop_reconciled_labels_keep_order(texts in prop::collection::vec("[a-z]{1,5}", 0..10)) {
        let mut host = InstanceHost::new();
        let mut reconciler = Reconciler::new();
        reconciler
            .commit(&mut host, spark_mu::fragment(texts.iter().map(|t| label(t.clone()))))
            .unwrap();

        let shown: Vec<String> = host
            .children(host.root())
            .unwrap()
            .iter()
            .map(|c| host.text_content(*c).unwrap())
            .collect();
        prop_assert_eq!(shown, texts.clone());

        for id in host.children(host.root()).unwrap() {
            prop_assert!(matches!(host.node(*id).unwrap(), Node::Element(_)));
        }
    }
}

//! Property-based tests for the text format and the edit engine.
//!
//! 1. Rendering then parsing gives back the same collection.
//! 2. Rendered text is a fixed point of parse + render.
//! 3. The streaming renderer produces the same text as `render`.
//! 4. `go_up` after `go_down(i)` returns to the same node.
//! 5. A bookmark survives any walk and any child insertions, and popping it
//!    returns to the bookmarked node.

use proptest::prelude::*;

use sgf_go::bigfloat::BigFloat;
use sgf_go::engine::GoEngine;
use sgf_go::node::Node;
use sgf_go::parser::parse;
use sgf_go::property::Property;
use sgf_go::renderer::{RenderStream, render};
use sgf_go::values::{
    BoardSize, Color, Coord, CoordList, GameResult, Move, Ruleset, SimpleText, Text, UnknownValue,
    UnknownValues,
};

// ── Helpers ─────────────────────────────────────────────────────────────

const SIZE: usize = 9;

fn coord_strategy() -> impl Strategy<Value = Coord> {
    (0..SIZE, 0..SIZE).prop_map(|(x, y)| Coord::new(x, y))
}

fn color_strategy() -> impl Strategy<Value = Color> {
    prop_oneof![Just(Color::Black), Just(Color::White)]
}

fn move_strategy() -> impl Strategy<Value = Move> {
    prop_oneof![
        1 => Just(Move::Pass),
        6 => coord_strategy().prop_map(Move::Play),
    ]
}

fn text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 :\\]\\\\\\[\n]{0,16}"
}

fn property_strategy() -> impl Strategy<Value = Property> {
    prop_oneof![
        (color_strategy(), move_strategy()).prop_map(|(c, m)| Property::play(c, m)),
        text_strategy().prop_map(|s| Property::C(Text::new(&s))),
        text_strategy().prop_map(|s| Property::N(SimpleText::new(&s))),
        text_strategy().prop_map(|s| Property::PB(SimpleText::new(&s))),
        (-10_000i64..10_000, -3i32..3).prop_map(|(m, e)| Property::KM(BigFloat::new(m, e))),
        "[0-9]{1,30}(\\.[0-9]{1,30})?".prop_map(|s| Property::KM(s.parse().unwrap())),
        prop::collection::vec(coord_strategy(), 1..5)
            .prop_map(|cs| Property::AB(CoordList::from_coords(cs))),
        prop::collection::vec(coord_strategy(), 0..3)
            .prop_map(|cs| Property::TR(CoordList::from_coords(cs))),
        prop::collection::vec((coord_strategy(), coord_strategy()), 0..3).prop_map(Property::AR),
        prop::collection::vec((coord_strategy(), text_strategy()), 0..3).prop_map(|ls| {
            Property::LB(ls.into_iter().map(|(c, s)| (c, SimpleText::new(&s))).collect())
        }),
        any::<i64>().prop_map(Property::MN),
        prop_oneof![Just("B+R"), Just("W+3.5"), Just("0"), Just("?"), Just("Jigo")]
            .prop_map(|s| Property::RE(s.parse::<GameResult>().unwrap())),
        text_strategy().prop_map(|s| Property::RU(s.parse::<Ruleset>().unwrap())),
        prop::collection::vec(text_strategy(), 0..3).prop_map(|vs| {
            Property::Unknown(
                "XZ".to_string(),
                UnknownValues::new(vs.into_iter().map(UnknownValue)),
            )
        }),
    ]
}

fn node_strategy() -> impl Strategy<Value = Node> {
    let leaf = prop::collection::vec(property_strategy(), 0..4).prop_map(Node::with_properties);
    leaf.prop_recursive(4, 32, 3, |inner| {
        (
            prop::collection::vec(property_strategy(), 0..4),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(properties, children)| Node {
                properties,
                children,
            })
    })
}

fn tree_strategy() -> impl Strategy<Value = Node> {
    (
        prop::collection::vec(property_strategy(), 0..3),
        prop::collection::vec(node_strategy(), 0..4),
    )
        .prop_map(|(mut properties, children)| {
            properties.insert(0, Property::SZ(BoardSize::square(SIZE)));
            Node {
                properties,
                children,
            }
        })
}

#[derive(Clone, Debug)]
enum Op {
    Up,
    /// Go down to a child, chosen modulo the child count.
    Down(usize),
    /// Add a child at an index chosen modulo (child count + 1).
    Add(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Up),
        (0usize..8).prop_map(Op::Down),
        (0usize..8).prop_map(Op::Add),
    ]
}

/// Apply `op` where it is valid; invalid moves are skipped.
fn apply(engine: &mut GoEngine, op: &Op) {
    match *op {
        Op::Up => {
            if engine.cursor().has_parent() {
                engine.go_up().unwrap();
            }
        }
        Op::Down(i) => {
            let count = engine.cursor().child_count();
            if count > 0 {
                engine.go_down(i % count).unwrap();
            }
        }
        Op::Add(i) => {
            let index = i % (engine.cursor().child_count() + 1);
            engine.add_child(index, Node::new()).unwrap();
        }
    }
}

fn marker() -> Property {
    Property::Unknown(
        "MARK".to_string(),
        UnknownValues::new([UnknownValue("here".to_string())]),
    )
}

// ═════════════════════════════════════════════════════════════════════════
// 1-3. Text round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn parse_inverts_render(trees in prop::collection::vec(tree_strategy(), 1..3)) {
        let text = render(&trees);
        let parsed = parse(&text);
        prop_assert!(parsed.is_ok(), "failed to parse {:?}: {:?}", text, parsed);
        prop_assert_eq!(parsed.unwrap(), trees);
    }

    #[test]
    fn rendered_text_is_a_fixed_point(tree in tree_strategy()) {
        let text = render(std::slice::from_ref(&tree));
        let again = render(&parse(&text).unwrap());
        prop_assert_eq!(again, text);
    }

    #[test]
    fn stream_matches_render(trees in prop::collection::vec(tree_strategy(), 0..3)) {
        let streamed: String = RenderStream::new(&trees).chars().collect();
        prop_assert_eq!(streamed, render(&trees));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4-5. Navigation and bookmarks
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn down_then_up_is_identity(
        tree in tree_strategy(),
        walk in prop::collection::vec(0usize..8, 0..6),
    ) {
        let mut engine = GoEngine::new(tree);
        for i in walk {
            let count = engine.cursor().child_count();
            if count == 0 {
                break;
            }
            let before = engine.cursor().clone();
            engine.go_down(i % count).unwrap();
            engine.go_up().unwrap();
            prop_assert_eq!(engine.cursor(), &before);
            engine.go_down(i % count).unwrap();
        }
    }

    #[test]
    fn bookmark_survives_walks_and_insertions(
        tree in tree_strategy(),
        before in prop::collection::vec(op_strategy(), 0..12),
        after in prop::collection::vec(op_strategy(), 0..24),
    ) {
        let mut engine = GoEngine::new(tree);
        for op in &before {
            apply(&mut engine, op);
        }
        engine.put_property(marker()).unwrap();
        let depth = engine.cursor().depth();

        engine.push_position();
        for op in &after {
            apply(&mut engine, op);
        }
        engine.pop_position().unwrap();

        prop_assert!(engine.path_stack().is_empty());
        prop_assert_eq!(engine.cursor().depth(), depth);
        prop_assert_eq!(engine.get_property("MARK"), Some(&marker()));
        let root = engine.root_node();
        let mut marks = 0;
        let mut count = |n: &Node| marks += usize::from(n.has_property("MARK"));
        visit(&root, &mut count);
        prop_assert_eq!(marks, 1);
    }

    #[test]
    fn nested_bookmarks_unwind_in_order(
        tree in tree_strategy(),
        first in prop::collection::vec(op_strategy(), 0..10),
        second in prop::collection::vec(op_strategy(), 0..10),
    ) {
        let mut engine = GoEngine::new(tree);
        let outer = engine.cursor().path();
        engine.push_position();
        for op in &first {
            apply(&mut engine, op);
        }
        engine.put_property(marker()).unwrap();
        engine.push_position();
        for op in &second {
            apply(&mut engine, op);
        }
        engine.pop_position().unwrap();
        prop_assert_eq!(engine.get_property("MARK"), Some(&marker()));
        engine.pop_position().unwrap();
        prop_assert_eq!(engine.cursor().path(), outer);
    }
}

fn visit(node: &Node, f: &mut impl FnMut(&Node)) {
    f(node);
    for child in &node.children {
        visit(child, f);
    }
}

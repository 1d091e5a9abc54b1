//! Property tests: interning, canonical classes, tuple layout, inference
//! slots shared between tuple members and the tokenize/parse round trip on
//! balanced input

use clasp::frontend::core::node_array::NodeArray;
use clasp::frontend::core::type_system::ArraySize;
use clasp::{Bindings, Class, ClassTable, NameTable, Session, ValueInfo};
use proptest::prelude::*;

const SCALARS: [Class; 11] = [
    Class::BOOL,
    Class::U8,
    Class::U16,
    Class::U32,
    Class::U64,
    Class::I8,
    Class::I16,
    Class::I32,
    Class::I64,
    Class::F32,
    Class::F64,
];

const KEYWORDS: [&str; 11] = [
    "return", "defer", "try", "assert", "with", "if", "else", "while", "for", "goto", "import",
];

fn scalar() -> impl Strategy<Value = Class> {
    (0..SCALARS.len()).prop_map(|index| SCALARS[index])
}

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}".prop_filter("keywords are not names", |name| !KEYWORDS.contains(&name.as_str()))
}

fn expression() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        any::<u32>().prop_map(|n| n.to_string()),
        (0u32..10_000, 0u32..10_000).prop_map(|(whole, fraction)| format!("{whole}.{fraction}")),
        identifier(),
        "[a-zA-Z0-9 ]{0,12}".prop_map(|text| format!("\"{text}\"")),
        "[a-z]".prop_map(|c| format!("'{c}'")),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        let operator = prop_oneof![
            Just("+"),
            Just("-"),
            Just("*"),
            Just("/"),
            Just("**"),
            Just("<"),
            Just("&&"),
            Just("|"),
            Just("<<")
        ];
        prop_oneof![
            inner.clone().prop_map(|e| format!("({e})")),
            inner.clone().prop_map(|e| format!("-({e})")),
            (inner.clone(), operator, inner.clone()).prop_map(|(a, op, b)| format!("{a} {op} {b}")),
            (identifier(), prop::collection::vec(inner.clone(), 0..4))
                .prop_map(|(name, args)| format!("{name}({})", args.join(", "))),
            (identifier(), inner.clone()).prop_map(|(name, index)| format!("{name}[{index}]")),
            (identifier(), identifier()).prop_map(|(base, field)| format!("{base}.{field}")),
        ]
    })
}

/// Declarations and blocks, one statement per line
fn unit() -> impl Strategy<Value = String> {
    prop::collection::vec((expression(), any::<bool>()), 1..6).prop_map(|statements| {
        statements
            .into_iter()
            .enumerate()
            .map(|(i, (e, block))| {
                if block {
                    format!("{{ tmp := {e}; tmp }}")
                } else {
                    format!("v{i} := {e}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}

/// Tuple members as `(scalar index, array length)`
fn shared_members() -> impl Strategy<Value = Vec<(usize, u32)>> {
    prop::collection::vec((0..SCALARS.len(), 1u32..5), 2..8)
}

/// Slots 1..=11 name element classes, 12..=15 name array lengths
fn element_slot(scalar: usize) -> u8 {
    scalar as u8 + 1
}

fn length_slot(length: u32) -> u8 {
    11 + length as u8
}

fn walked_slots(array: &NodeArray) -> usize {
    array.iter().map(|(_, node, _)| array.size_of(node.kind)).sum::<usize>() + 1
}

proptest! {
    #[test]
    fn prop_interning_is_idempotent(
        names in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..48), 1..32)
    ) {
        let mut table = NameTable::default();
        let first: Vec<_> = names.iter().map(|name| table.intern(name).unwrap()).collect();
        let second: Vec<_> = names.iter().map(|name| table.intern(name).unwrap()).collect();
        prop_assert_eq!(&first, &second);

        for (i, a) in names.iter().enumerate() {
            prop_assert_eq!(table.resolve(first[i]), Some(a.as_slice()));
            for (j, b) in names.iter().enumerate() {
                prop_assert_eq!(a == b, first[i] == first[j]);
            }
        }
    }

    #[test]
    fn prop_arrays_are_canonical(
        pairs in prop::collection::vec((scalar(), 0u32..64), 1..24)
    ) {
        let mut classes = ClassTable::default();
        let interned: Vec<_> = pairs
            .iter()
            .map(|&(element, size)| classes.intern_array(element, ArraySize::Fixed(size)).unwrap())
            .collect();
        for (i, a) in pairs.iter().enumerate() {
            let again = classes.intern_array(a.0, ArraySize::Fixed(a.1)).unwrap();
            prop_assert_eq!(again, interned[i]);
            for (j, b) in pairs.iter().enumerate() {
                prop_assert_eq!(a == b, interned[i] == interned[j]);
            }
        }
    }

    #[test]
    fn prop_tuple_layout_pads_members(members in prop::collection::vec(scalar(), 2..10)) {
        let mut classes = ClassTable::default();
        let tuple = classes.intern_tuple(&members).unwrap();

        let mut size = 0u32;
        let mut alignment = 1u32;
        for &member in &members {
            let layout = classes.layout(member).unwrap();
            size = size.next_multiple_of(layout.alignment) + layout.bytesize;
            alignment = alignment.max(layout.alignment);
        }
        let layout = classes.layout(tuple).unwrap();
        prop_assert_eq!(layout.alignment, alignment);
        prop_assert_eq!(layout.bytesize, size.next_multiple_of(alignment));
    }

    #[test]
    fn prop_slots_bound_by_earlier_members(members in shared_members(), bare in any::<bool>()) {
        let mut classes = ClassTable::default();
        let mut sources = Vec::new();
        let mut targets = Vec::new();
        let mut seen_elements = Vec::new();
        let mut seen_lengths = Vec::new();
        for &(scalar, length) in &members {
            let element = SCALARS[scalar];
            let want_element = if seen_elements.contains(&scalar) {
                Class::variable(element_slot(scalar))
            } else {
                seen_elements.push(scalar);
                Class::infered(element_slot(scalar))
            };
            let want_length = if seen_lengths.contains(&length) {
                ArraySize::Variable(length_slot(length))
            } else {
                seen_lengths.push(length);
                ArraySize::Infered(length_slot(length))
            };
            if bare {
                sources.push(element);
                targets.push(want_element);
            } else {
                sources.push(classes.intern_array(element, ArraySize::Fixed(length)).unwrap());
                targets.push(classes.intern_array(want_element, want_length).unwrap());
            }
        }
        let source = classes.intern_tuple(&sources).unwrap();
        let target = classes.intern_tuple(&targets).unwrap();

        let mut bindings = Bindings::new();
        prop_assert_eq!(classes.match_class(source, target, &mut bindings), Ok(source));
        for &(scalar, length) in &members {
            prop_assert_eq!(bindings.class(element_slot(scalar)), Ok(SCALARS[scalar]));
            if !bare {
                prop_assert_eq!(
                    bindings.value(length_slot(length)),
                    Ok(ValueInfo::constant(Class::USIZE, length as u64))
                );
            }
        }
    }

    #[test]
    fn prop_balanced_input_round_trips(source in unit()) {
        let mut session = Session::default();
        let unit = session.compile_unit(source.as_bytes());
        prop_assert!(unit.is_ok(), "{:?} on {:?}", unit.as_ref().err(), source);
        let unit = unit.unwrap();

        for array in [&unit.tokens, &unit.ast] {
            prop_assert!(array.is_terminated());
            prop_assert_eq!(walked_slots(array), array.len());
            let words = array.to_words();
            let decoded = NodeArray::from_words(array.layout(), &words);
            prop_assert_eq!(decoded.as_ref(), Some(array));
        }
    }
}

use proptest::prelude::*;

use rpcgen_rust::model::{CompilationUnit, Field, Message, Primitive, RpcMethod, Service};
use rpcgen_rust::parser::parse;

fn arb_field() -> impl Strategy<Value = (Primitive, Option<usize>)> {
    (
        prop::sample::select(Primitive::ALL.to_vec()),
        prop::option::of(0usize..64),
    )
}

/// Messages `M0..Mn` and services `S0..Sk` whose methods only reference
/// existing messages. Names are positional so they are unique by
/// construction.
fn arb_unit() -> impl Strategy<Value = CompilationUnit> {
    (1usize..5)
        .prop_flat_map(|n_messages| {
            (
                prop::collection::vec(prop::collection::vec(arb_field(), 0..6), n_messages),
                prop::collection::vec(
                    prop::collection::vec((0..n_messages, 0..n_messages), 0..6),
                    0..3,
                ),
            )
        })
        .prop_map(|(messages, services)| CompilationUnit {
            messages: messages
                .into_iter()
                .enumerate()
                .map(|(i, fields)| Message {
                    name: format!("M{i}"),
                    fields: fields
                        .into_iter()
                        .enumerate()
                        .map(|(j, (ty, array_len))| Field {
                            ty,
                            name: format!("f{j}"),
                            array_len,
                        })
                        .collect(),
                })
                .collect(),
            services: services
                .into_iter()
                .enumerate()
                .map(|(i, methods)| Service {
                    name: format!("S{i}"),
                    methods: methods
                        .into_iter()
                        .enumerate()
                        .map(|(k, (arg, ret))| RpcMethod {
                            id: k as u32,
                            name: format!("call_{k}"),
                            arg: format!("M{arg}"),
                            ret: format!("M{ret}"),
                        })
                        .collect(),
                })
                .collect(),
        })
}

proptest! {
    #[test]
    fn render_then_parse_is_identity(unit in arb_unit()) {
        let reparsed = parse(&unit.to_idl()).expect("rendered IDL parses");
        prop_assert_eq!(reparsed, unit);
    }

    #[test]
    fn ids_are_declaration_positions(unit in arb_unit()) {
        let reparsed = parse(&unit.to_idl()).unwrap();
        for svc in &reparsed.services {
            let ids: Vec<u32> = svc.methods.iter().map(|m| m.id).collect();
            let expected: Vec<u32> = (0..svc.methods.len() as u32).collect();
            prop_assert_eq!(ids, expected);
        }
    }

    #[test]
    fn swapping_declarations_swaps_ids_only(
        unit in arb_unit().prop_filter("needs a service with two methods", |u| {
            u.services.first().is_some_and(|s| s.methods.len() >= 2)
        }),
        picks in (any::<prop::sample::Index>(), any::<prop::sample::Index>()),
    ) {
        let original = &unit.services[0];
        let n = original.methods.len();
        let (a, b) = (picks.0.index(n), picks.1.index(n));
        prop_assume!(a != b);

        let mut swapped = unit.clone();
        swapped.services[0].methods.swap(a, b);
        let reparsed = parse(&swapped.to_idl()).unwrap();
        let svc = &reparsed.services[0];

        for (pos, method) in original.methods.iter().enumerate() {
            let now = svc.method(&method.name).unwrap();
            let expected_id = if pos == a { b } else if pos == b { a } else { pos };
            prop_assert_eq!(now.id as usize, expected_id);
            prop_assert_eq!(&now.arg, &method.arg);
            prop_assert_eq!(&now.ret, &method.ret);
        }
        prop_assert_eq!(&reparsed.messages, &unit.messages);
    }
}

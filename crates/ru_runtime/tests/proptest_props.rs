use std::collections::HashMap;

use proptest::prelude::*;
use ru_core::SymbolTable;
use ru_runtime::{Binding, CellDict, Runtime, RuntimeConfig, Value};

const NAMES: [&str; 5] = ["@a", "@b", "@c", "@d", "@e"];

fn value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(|i| Value::from_i64(i as i64)),
        (-1.0e9f64..1.0e9).prop_map(Value::from_f64),
        any::<bool>().prop_map(Value::from_bool),
        Just(Value::NIL),
    ]
}

fn config() -> impl Strategy<Value = RuntimeConfig> {
    (any::<bool>(), any::<bool>()).prop_map(|(unbox_ints, unbox_floats)| RuntimeConfig {
        unbox_ints,
        unbox_floats,
    })
}

proptest! {
    #[test]
    fn attribute_get_returns_last_set(
        cfg in config(),
        ops in prop::collection::vec((0..NAMES.len(), value()), 0..40),
    ) {
        let mut rt = Runtime::with_config(cfg);
        let obj = rt.new_object(rt.classes().object);
        let syms = NAMES.map(|n| rt.intern(n));
        let mut expected = HashMap::new();
        for (idx, v) in ops {
            rt.set_attribute(obj, syms[idx], v).unwrap();
            expected.insert(idx, v);
        }
        for (idx, sym) in syms.iter().enumerate() {
            prop_assert_eq!(rt.get_attribute(obj, *sym), expected.get(&idx).copied());
        }
        prop_assert_eq!(rt.instance_variable_names(obj).len(), expected.len());
    }
}

proptest! {
    #[test]
    fn identical_histories_share_a_map(
        ops in prop::collection::vec((0..NAMES.len(), value()), 0..30),
    ) {
        let mut rt = Runtime::new();
        let class = rt.classes().object;
        let p = rt.new_object(class);
        let q = rt.new_object(class);
        let syms = NAMES.map(|n| rt.intern(n));
        for (idx, v) in &ops {
            rt.set_attribute(p, syms[*idx], *v).unwrap();
        }
        let nodes = rt.shapes().node_count();
        for (idx, v) in &ops {
            rt.set_attribute(q, syms[*idx], *v).unwrap();
        }
        prop_assert_eq!(rt.object(p.as_obj_id()).map(), rt.object(q.as_obj_id()).map());
        prop_assert_eq!(rt.shapes().node_count(), nodes);
    }
}

proptest! {
    #[test]
    fn version_changes_exactly_on_shape_changes(
        ops in prop::collection::vec((0..4usize, any::<bool>(), any::<i32>()), 0..60),
    ) {
        let mut syms = SymbolTable::new();
        let keys = ["a", "b", "c", "d"].map(|n| syms.intern(n));
        let mut dict = CellDict::new();
        let mut seen = Vec::new();
        for (k, delete, n) in ops {
            let before = dict.version();
            let was = dict.binding(keys[k]).map(|b| matches!(b, Binding::Cell(_)));
            if delete {
                let removed = dict.delete(keys[k]);
                prop_assert_eq!(removed, was.is_some());
                prop_assert_eq!(dict.version() != before, removed);
            } else {
                dict.set(keys[k], Value::from_i64(n as i64)).unwrap();
                prop_assert_eq!(dict.get(keys[k]), Some(Value::from_i64(n as i64)));
                let promoted_already = was == Some(true);
                prop_assert_eq!(dict.version() == before, promoted_already);
            }
            prop_assert!(!seen.contains(&dict.version()) || dict.version() == before);
            seen.push(dict.version());
        }
    }
}

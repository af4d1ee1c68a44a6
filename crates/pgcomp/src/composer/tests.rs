//! Tests for the composer tree, cursor and placeholder numbering.

use crate::composer::{Composer, NodeId};
use crate::error::ComposeError;
use crate::operator::{self, Operator};
use crate::value::{Null, NullBool, NullFloat64, NullInt64, NullString};

fn debug_args(comp: &Composer, id: NodeId) -> Vec<String> {
    comp.get(id).args().iter().map(|a| format!("{a:?}")).collect()
}

/// Root without reserved args; child A gets `len_a` expressions, B `len_b`.
fn prepare(len_a: usize, len_b: usize) -> (Composer, NodeId, NodeId) {
    let mut comp = Composer::new(0, 0, &[len_a, len_b]);

    let a = comp.compose(&[]);
    for i in 0..len_a {
        comp.at(a).add_expr(format!("column_{i}"), operator::E, "value");
    }

    let b = comp.compose(&[]);
    for i in 0..len_b {
        comp.at(b).add_expr(format!("column_{i}"), operator::E, "value");
    }

    (comp, a, b)
}

/// Walk a node to the end, collecting `key oper placeholder` lines.
fn walk(comp: &mut Composer, id: NodeId) -> Vec<String> {
    let mut out = Vec::new();
    let mut node = comp.at(id);
    while node.next() {
        out.push(format!(
            "{} {} {}",
            node.key().unwrap(),
            node.oper().unwrap(),
            node.placeholder().unwrap()
        ));
    }
    out
}

// ==================== Tree & pool ====================

#[test]
fn test_new_prebuilds_children() {
    let comp = Composer::new(1, 1, &[0]);
    let root = comp.get(comp.root());
    assert_eq!(root.children().len(), 1);
    assert_eq!(root.composed(), 0);
    assert!(root.parent().is_none());
    assert!(comp.is_empty());
}

#[test]
fn test_compose_vends_pool_in_order_then_allocates() {
    let mut comp = Composer::new(0, 0, &[2, 2]);
    let pooled = comp.get(comp.root()).children().to_vec();

    let a = comp.compose(&[]);
    let b = comp.compose(&[]);
    let c = comp.compose(&[]);

    assert_eq!(vec![a, b], pooled);
    assert_ne!(c, a);
    assert_ne!(c, b);

    let root = comp.get(comp.root());
    assert_eq!(root.composed(), 3);
    assert_eq!(root.children(), &[a, b, c]);
    assert_eq!(comp.get(c).parent(), Some(NodeId::ROOT));
}

#[test]
fn test_compose_on_child_builds_grandchildren() {
    let mut comp = Composer::new(0, 0, &[]);
    let child = comp.compose(&[1, 1, 1]);
    assert_eq!(comp.get(child).children().len(), 3);

    let grandchild = comp.at(child).compose(&[]);
    assert_eq!(comp.get(grandchild).parent(), Some(child));
    assert_eq!(comp.get(child).composed(), 1);
}

#[test]
fn test_compose_with_capacities_replaces_pooled_grandchildren() {
    let mut comp = Composer::new(0, 0, &[2]);
    let pooled = comp.get(comp.root()).children()[0];

    // Give the pooled child its own pooled children before it is vended.
    let old = comp.at(pooled).compose(&[]);
    assert_eq!(comp.get(pooled).children(), &[old]);

    let child = comp.compose(&[4, 4]);
    assert_eq!(child, pooled);

    let fresh = comp.get(child).children().to_vec();
    assert_eq!(fresh.len(), 2);
    assert!(!fresh.contains(&old));
    for id in fresh {
        assert_eq!(comp.get(id).parent(), Some(child));
    }
}

#[test]
fn test_capacity_is_only_a_hint() {
    let mut comp = Composer::new(0, 1, &[]);
    for i in 0..50_i64 {
        comp.add_expr("c", operator::E, i);
        comp.add_arg(i);
    }
    assert_eq!(comp.len(), 50);
    assert_eq!(comp.args().len(), 100);
}

#[test]
#[should_panic(expected = "does not belong to this composer")]
fn test_foreign_node_id_panics() {
    let mut big = Composer::new(0, 0, &[1, 1, 1]);
    let foreign = big.compose(&[]);
    let foreign = big.at(foreign).compose(&[]);

    let mut small = Composer::new(0, 0, &[]);
    small.at(foreign);
}

// ==================== Arguments ====================

#[test]
fn test_add_arg_spread_over_tree() {
    let max = 100;
    let mut comp = Composer::new(max, max, &[3]);
    let filter = comp.compose(&[]);
    let update = comp.compose(&[]);

    for i in 0..max as i64 {
        match i % 3 {
            0 => comp.add_arg(i),
            1 => {
                comp.at(filter).add_arg(i);
            }
            _ => {
                comp.at(update).add_arg(i);
            }
        }
    }

    assert_eq!(comp.args().len(), max);
}

#[test]
fn test_args_order_root_then_children() {
    let mut comp = Composer::new(3, 0, &[2, 2]);
    let a = comp.compose(&[]);
    let b = comp.compose(&[]);

    comp.add_arg("root");
    comp.at(a).add_expr("a1", operator::E, "A1").add_expr("a2", operator::E, "A2");
    comp.at(b).add_expr("b1", operator::E, "B1").add_expr("b2", operator::E, "B2");

    assert_eq!(
        debug_args(&comp, comp.root()),
        vec!["\"root\"", "\"A1\"", "\"A2\"", "\"B1\"", "\"B2\""]
    );
}

#[test]
fn test_args_puts_static_args_before_expression_args() {
    let mut comp = Composer::new(0, 0, &[]);
    let child = comp.compose(&[]);
    comp.at(child).add_expr("k", operator::E, 2_i64).add_arg(1_i64);
    comp.add_expr("root", operator::E, 0_i64);

    assert_eq!(debug_args(&comp, child), vec!["1", "2"]);
    assert_eq!(debug_args(&comp, comp.root()), vec!["0", "1", "2"]);
}

#[test]
fn test_args_flattens_one_level_only() {
    let mut comp = Composer::new(0, 0, &[]);
    let child = comp.compose(&[]);
    let grandchild = comp.at(child).compose(&[]);

    comp.at(child).add_expr("c", operator::E, 1_i64);
    comp.at(grandchild).add_expr("g", operator::E, 2_i64);

    assert_eq!(debug_args(&comp, comp.root()), vec!["1"]);
    assert_eq!(debug_args(&comp, child), vec!["1", "2"]);
    assert_eq!(debug_args(&comp, grandchild), vec!["2"]);
}

#[test]
fn test_args_as_refs_matches_len() {
    let mut comp = Composer::new(1, 0, &[]);
    comp.add_arg(10_i64);
    comp.add_expr("id", operator::E, 1_i32);
    let args = comp.args();
    assert_eq!(args.as_refs().len(), 2);
    assert_eq!(args.into_vec().len(), 2);
}

// ==================== Expressions ====================

#[test]
fn test_add_expr_counts_per_node() {
    let max = 99;
    let expected = max / 3;

    let mut comp = Composer::new(0, 0, &[]);
    let filter = comp.compose(&[]);
    let update = comp.compose(&[]);

    for i in 0..max {
        match i % 3 {
            0 => comp.add_expr(format!("column_parent_{i}"), operator::E, i as i64),
            1 => {
                comp.at(filter).add_expr(format!("column_where_{i}"), operator::E, i as i64);
            }
            _ => {
                comp.at(update).add_expr(format!("column_update_{i}"), operator::E, i as i64);
            }
        }
    }

    assert_eq!(comp.len(), expected);
    assert_eq!(comp.get(filter).len(), expected);
    assert_eq!(comp.get(update).len(), expected);
}

#[test]
fn test_len_excludes_children() {
    let mut comp = Composer::new(1, 1, &[2]);
    let a = comp.compose(&[]);
    let b = comp.compose(&[]);
    for _ in 0..2 {
        comp.at(a).add_expr("column", operator::E, "value");
    }
    for _ in 0..4 {
        comp.at(b).add_expr("column", operator::E, "value");
    }

    assert_eq!(comp.len(), 0);
    assert_eq!(comp.get(a).len(), 2);
    assert_eq!(comp.get(b).len(), 4);
}

#[test]
fn test_add_expr_filters_nullable_wrappers() {
    let mut comp = Composer::new(0, 0, &[]);
    comp.add_expr("int64-valid", operator::E, &NullInt64::new(1));
    comp.add_expr("int64-invalid", operator::E, &NullInt64 { value: 2, valid: false });
    comp.add_expr("string-valid", operator::E, &NullString::new("3".to_string()));
    comp.add_expr("string-invalid", operator::E, &NullString { value: "4".to_string(), valid: false });
    comp.add_expr("float64-valid", operator::E, &NullFloat64::new(5.0));
    comp.add_expr("float64-invalid", operator::E, &NullFloat64 { value: 6.0, valid: false });
    comp.add_expr("bool-valid", operator::E, &NullBool::new(true));
    comp.add_expr("bool-invalid", operator::E, &NullBool { value: true, valid: false });

    assert_eq!(comp.len(), 4);
    assert_eq!(debug_args(&comp, comp.root()), vec!["1", "\"3\"", "5.0", "true"]);
}

#[test]
fn test_add_expr_nil_values_are_never_recorded() {
    let mut comp = Composer::new(0, 0, &[]);
    let s: Option<&NullString> = None;
    let i: Option<&NullInt64> = None;
    comp.add_expr("v1", operator::E, Null);
    comp.add_expr("v2", operator::E, s);
    comp.add_expr("v3", operator::E, i);
    comp.add_expr("v4", operator::E, None::<Vec<u8>>);

    assert_eq!(comp.len(), 0);
    assert!(comp.args().is_empty());
}

#[test]
fn test_add_expr_expands_sequences() {
    let mut comp = Composer::new(0, 0, &[]);
    comp.add_expr("[]string", Operator::In, vec!["1", "2", "3"]);
    comp.add_expr("[]int64", Operator::In, vec![1_i64, 2, 3]);

    assert_eq!(comp.len(), 6);
    assert_eq!(comp.args().len(), 6);

    let mut root = comp.at(NodeId::ROOT);
    let mut seen = Vec::new();
    while root.next() {
        seen.push((root.key().unwrap().to_string(), root.oper().unwrap().to_string()));
    }
    assert!(seen[..3].iter().all(|(k, o)| k == "[]string" && o == "IN"));
    assert!(seen[3..].iter().all(|(k, o)| k == "[]int64" && o == "IN"));
}

#[test]
fn test_add_expr_accepts_string_operators() {
    let mut comp = Composer::new(0, 0, &[]);
    comp.add_expr("tags", "&&", vec!["a".to_string()]);
    comp.add_expr("name", String::from("ILIKE"), "%a%");

    let mut root = comp.at(NodeId::ROOT);
    assert!(root.next());
    assert_eq!(root.oper().unwrap(), "&&");
    assert!(root.next());
    assert_eq!(root.oper().unwrap(), "ILIKE");
}

#[test]
fn test_parallel_sequences_stay_aligned() {
    let mut comp = Composer::new(0, 0, &[]);
    comp.add_arg(0_i64);
    comp.add_expr("a", operator::E, Null);
    comp.add_expr("b", operator::E, vec![1_i32, 2]);
    comp.add_arg(1_i64);
    comp.add_expr("c", operator::GT, NullInt64::null());
    comp.add_expr("d", operator::LT, 3_i32);

    let node = &comp.nodes[0];
    assert_eq!(node.keys.len(), node.operators.len());
    assert_eq!(node.keys.len(), node.arguments.len());
    assert_eq!(node.keys.len(), 3);
    assert_eq!(node.extra_args.len(), 2);
}

// ==================== Cursor ====================

#[test]
fn test_next_stops_at_end() {
    let mut comp = Composer::new(0, 0, &[]);
    comp.add_expr("a", operator::E, 1_i64);

    let mut root = comp.at(NodeId::ROOT);
    assert!(root.next());
    assert!(!root.next());
    assert_eq!(root.as_ref().cursor(), 1);
    assert_eq!(root.key().unwrap(), "a");
}

#[test]
fn test_next_bumps_parent_one_level_only() {
    let mut comp = Composer::new(0, 0, &[]);
    let child = comp.compose(&[]);
    let grandchild = comp.at(child).compose(&[]);
    comp.at(grandchild).add_expr("g", operator::E, 1_i64);

    assert!(comp.at(grandchild).next());
    assert_eq!(comp.get(grandchild).cursor(), 1);
    assert_eq!(comp.get(child).cursor(), 1);
    assert_eq!(comp.get(NodeId::ROOT).cursor(), 0);
}

#[test]
fn test_failed_next_leaves_state() {
    let mut comp = Composer::new(0, 0, &[]);
    let child = comp.compose(&[]);
    assert!(!comp.at(child).next());
    assert_eq!(comp.get(child).cursor(), 0);
    assert_eq!(comp.get(NodeId::ROOT).cursor(), 0);
}

#[test]
fn test_reset_does_not_touch_parent() {
    let (mut comp, a, _) = prepare(2, 0);
    assert!(comp.at(a).next());
    assert!(comp.at(a).next());
    comp.at(a).reset();

    assert_eq!(comp.get(a).cursor(), 0);
    assert_eq!(comp.get(NodeId::ROOT).cursor(), 2);
}

#[test]
fn test_key_before_next_is_out_of_range() {
    let mut comp = Composer::new(0, 0, &[]);
    comp.add_expr("a", operator::E, 1_i64);

    let root = comp.get(NodeId::ROOT);
    assert_eq!(
        root.key().unwrap_err(),
        ComposeError::CursorOutOfRange { cursor: 0, len: 1 }
    );
    assert!(root.oper().unwrap_err().is_out_of_range());
    assert!(root.placeholder().unwrap_err().is_out_of_range());
}

#[test]
fn test_key_on_empty_node_is_out_of_range() {
    let comp = Composer::new(0, 0, &[]);
    assert!(comp.get(comp.root()).key().is_err());
}

#[test]
fn test_parent_key_out_of_range_when_advanced_by_child() {
    let (mut comp, a, _) = prepare(1, 0);
    assert!(comp.at(a).next());
    // The root was bumped past its own (empty) expression list.
    assert_eq!(
        comp.get(NodeId::ROOT).key().unwrap_err(),
        ComposeError::CursorOutOfRange { cursor: 1, len: 0 }
    );
}

#[test]
fn test_key_follows_cursor() {
    let (len_a, len_b) = (10, 20);
    let (mut comp, a, b) = prepare(len_a, len_b);

    let mut j = 0;
    let mut node = comp.at(a);
    while node.next() {
        assert_eq!(node.key().unwrap(), format!("column_{j}"));
        j += 1;
    }
    let mut node = comp.at(b);
    while node.next() {
        assert_eq!(node.key().unwrap(), format!("column_{}", j - len_a));
        assert_eq!(node.oper().unwrap(), Operator::Equal.as_str());
        j += 1;
    }
    assert_eq!(j, len_a + len_b);
}

#[test]
fn test_first_true_once_per_cycle() {
    let (mut comp, a, _) = prepare(10, 20);

    for _ in 0..2 {
        let mut firsts = 0;
        let mut node = comp.at(a);
        assert!(!node.first());
        while node.next() {
            if node.first() {
                firsts += 1;
            }
        }
        assert_eq!(firsts, 1);
        assert!(!node.first());
        node.reset();
    }
}

// ==================== Placeholders ====================

#[test]
fn test_placeholders_consecutive_across_children() {
    let (mut comp, a, b) = prepare(10, 20);

    let mut j = 0;
    for id in [a, b] {
        let mut node = comp.at(id);
        while node.next() {
            j += 1;
            assert_eq!(node.placeholder().unwrap(), format!("${j}"));
        }
    }
    assert_eq!(j, 30);
}

#[test]
fn test_placeholders_start_after_reserved_args() {
    let mut comp = Composer::new(3, 0, &[2, 2]);
    let a = comp.compose(&[]);
    let b = comp.compose(&[]);
    comp.at(a).add_expr("a1", operator::E, 1_i64).add_expr("a2", operator::E, 2_i64);
    comp.at(b).add_expr("b1", operator::E, 3_i64).add_expr("b2", operator::E, 4_i64);

    let mut seen = Vec::new();
    for id in [a, b] {
        let mut node = comp.at(id);
        while node.next() {
            seen.push(node.placeholder().unwrap());
        }
    }
    assert_eq!(seen, vec!["$4", "$5", "$6", "$7"]);
}

#[test]
fn test_root_placeholder_uses_own_cursor() {
    let mut comp = Composer::new(2, 2, &[]);
    comp.add_expr("x", operator::E, 1_i64);
    let mut root = comp.at(NodeId::ROOT);
    assert!(root.next());
    assert_eq!(root.placeholder().unwrap(), "$3");
}

#[test]
fn test_rewind_reproduces_sequence() {
    let mut comp = Composer::new(1, 1, &[1, 3]);
    let update = comp.compose(&[]);
    let filter = comp.compose(&[]);
    comp.at(update).add_expr("u.username", operator::E, "johnsnow");
    comp.at(filter).add_expr("u.id", operator::E, 1_i64);
    comp.at(filter).add_expr("u.age", operator::GT, 30_i64);

    let first: Vec<String> = [update, filter].iter().flat_map(|&id| walk(&mut comp, id)).collect();
    comp.rewind();
    let second: Vec<String> = [update, filter].iter().flat_map(|&id| walk(&mut comp, id)).collect();

    assert_eq!(first, vec!["u.username = $2", "u.id = $3", "u.age > $4"]);
    assert_eq!(first, second);
}

#[test]
fn test_reset_on_root_reproduces_sequence() {
    let mut comp = Composer::new(0, 3, &[]);
    comp.add_expr("a", operator::E, 1_i64);
    comp.add_expr("b", operator::NE, 2_i64);
    comp.add_expr("c", operator::LTE, 3_i64);

    let first = walk(&mut comp, NodeId::ROOT);
    comp.at(NodeId::ROOT).reset();
    let second = walk(&mut comp, NodeId::ROOT);

    assert_eq!(first, vec!["a = $1", "b <> $2", "c <= $3"]);
    assert_eq!(first, second);
}

#[test]
fn test_update_statement_end_to_end() {
    let mut comp = Composer::new(1, 1, &[1, 3]);
    let update = comp.compose(&[]);
    let filter = comp.compose(&[]);

    comp.add_arg(10_i64);

    comp.at(update)
        .add_expr("u.username", operator::E, "johnsnow")
        .add_expr("u.first_name", operator::E, "John")
        .add_expr("u.last_name", operator::E, &NullString::new("Snow".to_string()));
    comp.at(filter)
        .add_expr("u.id", operator::E, 1_i64)
        .add_expr("u.age", operator::GT, &NullInt64 { value: 1000, valid: false });

    let mut set = String::new();
    let mut node = comp.at(update);
    while node.next() {
        set.push_str(if node.first() { "SET " } else { ", " });
        set.push_str(&format!(
            "{} {} {}",
            node.key().unwrap(),
            node.oper().unwrap(),
            node.placeholder().unwrap()
        ));
    }

    let mut filter_sql = String::new();
    let mut node = comp.at(filter);
    while node.next() {
        filter_sql.push_str(if node.first() { "WHERE " } else { " AND " });
        filter_sql.push_str(&format!(
            "{} {} {}",
            node.key().unwrap(),
            node.oper().unwrap(),
            node.placeholder().unwrap()
        ));
    }

    assert_eq!(
        format!("UPDATE users AS u {set} {filter_sql} LIMIT $1"),
        "UPDATE users AS u SET u.username = $2, u.first_name = $3, u.last_name = $4 \
         WHERE u.id = $5 LIMIT $1"
    );
    assert_eq!(debug_args(&comp, filter), vec!["1"]);
    assert_eq!(debug_args(&comp, update), vec!["\"johnsnow\"", "\"John\"", "\"Snow\""]);
    assert_eq!(
        debug_args(&comp, comp.root()),
        vec!["10", "\"johnsnow\"", "\"John\"", "\"Snow\"", "1"]
    );
}

#[test]
fn test_composer_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Composer>();
    assert_send_sync::<crate::arg::ArgList>();
}

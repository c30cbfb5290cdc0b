//! Dependency-ordered table creation

use std::collections::HashSet;

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Schema;

/// A creation order for every table in a schema, plus the cycles that had to
/// be broken to produce it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyOrder {
    /// Each table exactly once; referenced tables precede referencing ones
    /// except along a broken cycle edge.
    pub order: Vec<String>,
    /// Each cycle as a closed path, e.g. `["a", "b", "a"]`.
    pub cycles: Vec<Vec<String>>,
}

impl DependencyOrder {
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    /// Position of a table in the creation order
    pub fn position(&self, table: &str) -> Option<usize> {
        self.order.iter().position(|t| t == table)
    }
}

/// Build the table dependency graph. Nodes are table positions in
/// `schema.tables`; an edge `a -> b` means table `a` references table `b`.
///
/// Self-references and references to unknown tables are left out.
pub fn dependency_graph(schema: &Schema) -> DiGraphMap<usize, ()> {
    let mut graph = DiGraphMap::new();
    for index in 0..schema.tables.len() {
        graph.add_node(index);
    }

    let position = |name: &str| schema.tables.iter().position(|t| t.name == name);
    for fk in schema.foreign_keys() {
        if fk.is_self_reference() {
            continue;
        }
        match (position(&fk.source_table), position(&fk.target_table)) {
            (Some(source), Some(target)) => {
                graph.add_edge(source, target, ());
            }
            _ => debug!(
                source = %fk.source_table,
                target = %fk.target_table,
                "Skipping foreign key to unknown table"
            ),
        }
    }
    graph
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

struct Walker<'a> {
    schema: &'a Schema,
    graph: &'a DiGraphMap<usize, ()>,
    marks: Vec<Mark>,
    order: Vec<String>,
}

impl Walker<'_> {
    /// Post-order walk; an edge into a table still in progress closes a
    /// cycle and is ignored for ordering.
    fn visit(&mut self, node: usize) {
        self.marks[node] = Mark::InProgress;

        for dep in sorted_neighbors(self.graph, node) {
            if self.marks[dep] == Mark::Unvisited {
                self.visit(dep);
            }
        }

        self.marks[node] = Mark::Done;
        self.order.push(self.schema.tables[node].name.clone());
    }
}

fn sorted_neighbors(graph: &DiGraphMap<usize, ()>, node: usize) -> Vec<usize> {
    let mut deps: Vec<usize> = graph.neighbors(node).collect();
    deps.sort_unstable();
    deps
}

/// Every elementary cycle of the graph, each as a node path that starts and
/// ends at its lowest-indexed table.
///
/// The search runs inside each strongly connected component and only
/// extends a path through nodes above its start, so each cycle is found
/// exactly once.
fn elementary_cycles(graph: &DiGraphMap<usize, ()>) -> Vec<Vec<usize>> {
    let mut cycles = Vec::new();

    let mut components: Vec<Vec<usize>> = tarjan_scc(graph)
        .into_iter()
        .filter(|c| c.len() > 1)
        .map(|mut c| {
            c.sort_unstable();
            c
        })
        .collect();
    components.sort_unstable();

    for component in &components {
        let members: HashSet<usize> = component.iter().copied().collect();
        for &start in component {
            let mut path = vec![start];
            extend_cycles(graph, &members, start, &mut path, &mut cycles);
        }
    }
    cycles
}

fn extend_cycles(
    graph: &DiGraphMap<usize, ()>,
    members: &HashSet<usize>,
    start: usize,
    path: &mut Vec<usize>,
    cycles: &mut Vec<Vec<usize>>,
) {
    let Some(&last) = path.last() else {
        return;
    };
    for next in sorted_neighbors(graph, last) {
        if next == start {
            let mut cycle = path.clone();
            cycle.push(start);
            cycles.push(cycle);
        } else if next > start && members.contains(&next) && !path.contains(&next) {
            path.push(next);
            extend_cycles(graph, members, start, path, cycles);
            path.pop();
        }
    }
}

/// Compute a total creation order by depth-first search.
///
/// Dependencies are emitted before dependents. Tables are visited in schema
/// order, so the result is deterministic. Reaching a table that is still in
/// progress is skipped, so every table appears exactly once. Cycles are
/// enumerated separately, one entry per elementary cycle.
///
/// # Example
///
/// ```rust
/// use schema_forge::models::{Column, DataType, Relationship, Schema, Table};
/// use schema_forge::resolver::dependency_order;
///
/// let mut schema = Schema::new("shop");
/// schema.add_table(Table::new("orders", vec![
///     Column::new("id", DataType::Uuid).primary_key(),
///     Column::new("customer_id", DataType::Uuid),
/// ])).unwrap();
/// schema.add_table(Table::new("customers", vec![
///     Column::new("id", DataType::Uuid).primary_key(),
/// ])).unwrap();
/// schema.add_relationship(Relationship::new("orders", "customer_id", "customers", "id")).unwrap();
///
/// let order = dependency_order(&schema);
/// assert_eq!(order.order, vec!["customers", "orders"]);
/// assert!(!order.has_cycles());
/// ```
pub fn dependency_order(schema: &Schema) -> DependencyOrder {
    let count = schema.tables.len();
    let graph = dependency_graph(schema);
    let mut walker = Walker {
        schema,
        graph: &graph,
        marks: vec![Mark::Unvisited; count],
        order: Vec::with_capacity(count),
    };

    for node in 0..count {
        if walker.marks[node] == Mark::Unvisited {
            walker.visit(node);
        }
    }

    let cycles = elementary_cycles(&graph)
        .into_iter()
        .map(|cycle| {
            let path: Vec<String> = cycle
                .iter()
                .map(|&n| schema.tables[n].name.clone())
                .collect();
            debug!(cycle = %path.join(" -> "), "Dependency cycle detected");
            path
        })
        .collect();

    DependencyOrder {
        order: walker.order,
        cycles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, DataType, Relationship, Table};

    fn table(name: &str, refs: &[&str]) -> Table {
        let mut columns = vec![Column::new("id", DataType::Uuid).primary_key()];
        for target in refs {
            let name = format!("{}_id", target);
            columns.push(Column::new(name, DataType::Uuid).references(*target, "id"));
        }
        Table::new(name, columns)
    }

    fn schema_of(tables: Vec<Table>) -> Schema {
        let mut schema = Schema::new("test");
        schema.tables = tables;
        schema
    }

    #[test]
    fn test_dependencies_come_first() {
        let schema = schema_of(vec![
            table("order_items", &["orders", "products"]),
            table("orders", &["customers"]),
            table("products", &[]),
            table("customers", &[]),
        ]);
        let order = dependency_order(&schema);
        assert_eq!(order.order.len(), 4);
        assert!(order.position("customers") < order.position("orders"));
        assert!(order.position("orders") < order.position("order_items"));
        assert!(order.position("products") < order.position("order_items"));
        assert!(order.cycles.is_empty());
    }

    #[test]
    fn test_two_table_cycle_terminates() {
        let schema = schema_of(vec![table("a", &["b"]), table("b", &["a"])]);
        let order = dependency_order(&schema);
        assert_eq!(order.order, vec!["b", "a"]);
        assert_eq!(order.cycles, vec![vec!["a", "b", "a"]]);
    }

    #[test]
    fn test_self_reference_is_not_a_cycle() {
        let mut schema = schema_of(vec![Table::new(
            "employees",
            vec![
                Column::new("id", DataType::Uuid).primary_key(),
                Column::new("manager_id", DataType::Uuid),
            ],
        )]);
        schema.relationships.push(Relationship::new(
            "employees",
            "manager_id",
            "employees",
            "id",
        ));
        let order = dependency_order(&schema);
        assert_eq!(order.order, vec!["employees"]);
        assert!(!order.has_cycles());
    }

    #[test]
    fn test_unknown_target_is_ignored() {
        let schema = schema_of(vec![table("orders", &["ghosts"])]);
        let order = dependency_order(&schema);
        assert_eq!(order.order, vec!["orders"]);
    }

    #[test]
    fn test_three_table_cycle_reported_once() {
        let schema = schema_of(vec![
            table("a", &["b"]),
            table("b", &["c"]),
            table("c", &["a"]),
        ]);
        let order = dependency_order(&schema);
        assert_eq!(order.order.len(), 3);
        assert_eq!(order.cycles.len(), 1);
        assert_eq!(order.cycles[0].first(), order.cycles[0].last());
    }

    #[test]
    fn test_cycle_through_finished_table_is_reported() {
        let schema = schema_of(vec![
            table("a", &["b", "c"]),
            table("b", &["c"]),
            table("c", &["a"]),
        ]);
        let order = dependency_order(&schema);
        assert_eq!(order.order.len(), 3);
        assert_eq!(
            order.cycles,
            vec![vec!["a", "b", "c", "a"], vec!["a", "c", "a"]]
        );
    }

    #[test]
    fn test_separate_components_each_report() {
        let schema = schema_of(vec![
            table("a", &["b"]),
            table("b", &["a"]),
            table("c", &["d"]),
            table("d", &["c"]),
            table("e", &["a"]),
        ]);
        let order = dependency_order(&schema);
        assert_eq!(
            order.cycles,
            vec![vec!["a", "b", "a"], vec!["c", "d", "c"]]
        );
    }
}

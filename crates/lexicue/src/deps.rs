//! The package dependency graph.
//!
//! Reference resolution records one arc per (from-package, to-package) pair,
//! each carrying the set of (from-symbol, to-symbol) pairs that justify it.
//! The graph is read once at the end of a run to emit a Mermaid flowchart and
//! the list of elementary import cycles.

use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};

/// A directed arc, between two packages or between two symbols.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Arc {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Default)]
pub struct DependencyGraph {
    arcs: BTreeMap<Arc, BTreeSet<Arc>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one package arc justified by a (from-symbol, to-symbol) pair.
    /// Insertion is idempotent; self-loops are retained.
    pub fn record(&mut self, from_pkg: &str, to_pkg: &str, from_sym: &str, to_sym: &str) {
        self.arcs
            .entry(Arc {
                from: from_pkg.to_owned(),
                to: to_pkg.to_owned(),
            })
            .or_default()
            .insert(Arc {
                from: from_sym.to_owned(),
                to: to_sym.to_owned(),
            });
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Render the graph as a Mermaid flowchart. Node labels drop the module
    /// root prefix. Arcs into the prelude package are left out of the diagram
    /// but still participate in cycle detection.
    pub fn mermaid(&self, module_root: &str) -> String {
        let mut out = String::from("flowchart LR\n");
        let mut ids: BTreeMap<&str, usize> = BTreeMap::new();
        for arc in self.arcs.keys() {
            if arc.to == crate::LEXICUE_PKG {
                continue;
            }
            let from = node_id(&mut out, &mut ids, &arc.from, module_root);
            let to = node_id(&mut out, &mut ids, &arc.to, module_root);
            out.push_str(&format!("\tid{from} --> id{to}\n"));
        }
        out
    }

    /// Enumerate every elementary package cycle, canonically rotated so the
    /// lexicographically smallest member comes first, and render one block per
    /// cycle listing the symbol pairs behind each edge.
    pub fn cycles(&self, module_root: &str) -> String {
        let mut adjacency: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for arc in self.arcs.keys() {
            adjacency.entry(&arc.from).or_default().push(&arc.to);
        }
        let mut cycles: BTreeSet<String> = BTreeSet::new();
        for &start in adjacency.keys() {
            let mut visit = BTreeSet::new();
            let mut path = Vec::new();
            collect_cycles(&mut cycles, start, &adjacency, &mut visit, &mut path);
        }

        let mut out = String::new();
        for cycle in &cycles {
            let pkgs: Vec<&str> = cycle.split(" -> ").collect();
            for (i, pkg) in pkgs.iter().enumerate() {
                out.push_str(crate::nsid::trim_root(pkg, module_root));
                if i + 1 == pkgs.len() {
                    out.push('\n');
                    break;
                }
                out.push_str(" ->\n");
                let key = Arc {
                    from: pkgs[i].to_owned(),
                    to: pkgs[i + 1].to_owned(),
                };
                if let Some(symbols) = self.arcs.get(&key) {
                    for sym in symbols {
                        let to = if sym.to.is_empty() { "*" } else { &sym.to };
                        out.push_str(&format!("\t{} -> {}\n", sym.from, to));
                    }
                }
            }
            out.push('\n');
        }
        out
    }
}

fn node_id<'g>(
    out: &mut String,
    ids: &mut BTreeMap<&'g str, usize>,
    name: &'g str,
    module_root: &str,
) -> usize {
    if let Some(&id) = ids.get(name) {
        return id;
    }
    let id = ids.len();
    ids.insert(name, id);
    out.push_str(&format!(
        "\tid{id}[{}]\n",
        crate::nsid::trim_root(name, module_root)
    ));
    id
}

fn collect_cycles(
    cycles: &mut BTreeSet<String>,
    pkg: &str,
    adjacency: &BTreeMap<&str, Vec<&str>>,
    visit: &mut BTreeSet<String>,
    path: &mut Vec<String>,
) {
    if visit.contains(pkg) {
        // The sub-path from the revisited node onward is a cycle; rotate it
        // so the smallest package leads, then close it for printing.
        let pos = path.iter().position(|p| p == pkg).unwrap_or(0);
        let mut cycle: Vec<String> = path[pos..].to_vec();
        if let Some(min) = cycle.iter().position_min() {
            cycle.rotate_left(min);
        }
        if let Some(first) = cycle.first().cloned() {
            cycle.push(first);
        }
        cycles.insert(cycle.join(" -> "));
        return;
    }
    visit.insert(pkg.to_owned());
    path.push(pkg.to_owned());
    if let Some(nexts) = adjacency.get(pkg) {
        for &next in nexts {
            collect_cycles(cycles, next, adjacency, visit, path);
        }
    }
    path.pop();
    visit.remove(pkg);
}

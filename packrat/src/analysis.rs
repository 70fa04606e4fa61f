//! Left recursion detection.
//!
//! A rule is left-recursive when it can reach itself without consuming a
//! token. Rules are grouped into strongly connected components over the
//! "may call at the same mark" relation; each cyclic component gets one
//! leader, the first rule in declaration order whose removal leaves the
//! rest of the component acyclic.

use crate::grammar::{Expr, Recursion, RuleId};

/// Compute the recursion role of every rule. On failure, returns the rules
/// of a cycle that has no leader, in declaration order.
pub fn left_recursion(rules: &[&Expr]) -> Result<Vec<Recursion>, Vec<RuleId>> {
    let nullable = nullable_rules(rules);
    let edges: Vec<Vec<usize>> = rules
        .iter()
        .map(|expr| {
            let mut calls = Vec::new();
            first_calls(expr, &nullable, &mut calls);
            calls.sort_unstable();
            calls.dedup();
            calls
        })
        .collect();

    let mut roles = vec![Recursion::None; rules.len()];
    for mut scc in Tarjan::run(&edges) {
        scc.sort_unstable();
        let cyclic = scc.len() > 1 || edges[scc[0]].contains(&scc[0]);
        if !cyclic {
            continue;
        }
        let leader = scc
            .iter()
            .copied()
            .find(|candidate| !has_cycle(&scc, Some(*candidate), &edges))
            .ok_or_else(|| scc.iter().copied().map(RuleId::new).collect::<Vec<_>>())?;
        for idx in scc.iter() {
            roles[*idx] = if *idx == leader {
                Recursion::Leader
            } else {
                Recursion::Member
            };
        }
    }
    Ok(roles)
}

/// Which rules can succeed without consuming input, by fixed point.
fn nullable_rules(rules: &[&Expr]) -> Vec<bool> {
    let mut nullable = vec![false; rules.len()];
    loop {
        let mut changed = false;
        for (idx, expr) in rules.iter().enumerate() {
            if !nullable[idx] && is_nullable(expr, &nullable) {
                nullable[idx] = true;
                changed = true;
            }
        }
        if !changed {
            return nullable;
        }
    }
}

fn is_nullable(expr: &Expr, nullable: &[bool]) -> bool {
    match expr {
        Expr::Rule(id) => nullable[id.index()],
        Expr::Token(_) | Expr::Keyword(_) | Expr::SoftKeyword(_) | Expr::Punct(_) | Expr::Any => {
            false
        }
        Expr::Seq(items) => items.iter().all(|item| is_nullable(item, nullable)),
        Expr::Choice(alts) => alts.iter().any(|alt| is_nullable(alt, nullable)),
        Expr::Optional(_) | Expr::Lookahead { .. } | Expr::Cut => true,
        Expr::Repeat { expr, min } => *min == 0 || is_nullable(expr, nullable),
        Expr::Label(_, expr) => is_nullable(expr, nullable),
    }
}

/// Rules that may be invoked at the mark where `expr` starts.
fn first_calls(expr: &Expr, nullable: &[bool], out: &mut Vec<usize>) {
    match expr {
        Expr::Rule(id) => out.push(id.index()),
        Expr::Token(_)
        | Expr::Keyword(_)
        | Expr::SoftKeyword(_)
        | Expr::Punct(_)
        | Expr::Any
        | Expr::Cut => (),
        Expr::Seq(items) => {
            for item in items.iter() {
                first_calls(item, nullable, out);
                if !is_nullable(item, nullable) {
                    break;
                }
            }
        }
        Expr::Choice(alts) => {
            for alt in alts.iter() {
                first_calls(alt, nullable, out);
            }
        }
        Expr::Optional(expr)
        | Expr::Repeat { expr, .. }
        | Expr::Lookahead { expr, .. }
        | Expr::Label(_, expr) => first_calls(expr, nullable, out),
    }
}

/// Whether the subgraph induced by `nodes`, minus `removed`, has a cycle.
fn has_cycle(nodes: &[usize], removed: Option<usize>, edges: &[Vec<usize>]) -> bool {
    #[derive(Clone, Copy, PartialEq)]
    enum Color {
        White,
        Grey,
        Black,
    }

    fn visit(node: usize, nodes: &[usize], removed: Option<usize>, edges: &[Vec<usize>], colors: &mut [Color]) -> bool {
        colors[node] = Color::Grey;
        for next in edges[node].iter().copied() {
            if Some(next) == removed || !nodes.contains(&next) {
                continue;
            }
            let color = colors[next];
            match color {
                Color::Grey => return true,
                Color::White => {
                    if visit(next, nodes, removed, edges, colors) {
                        return true;
                    }
                }
                Color::Black => (),
            }
        }
        colors[node] = Color::Black;
        false
    }

    let mut colors = vec![Color::White; edges.len()];
    nodes.iter().copied().any(|node| {
        Some(node) != removed
            && colors[node] == Color::White
            && visit(node, nodes, removed, edges, &mut colors)
    })
}

/// Tarjan's strongly connected components.
struct Tarjan<'a> {
    edges: &'a [Vec<usize>],
    index: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    next_index: usize,
    components: Vec<Vec<usize>>,
}

impl<'a> Tarjan<'a> {
    fn run(edges: &'a [Vec<usize>]) -> Vec<Vec<usize>> {
        let n = edges.len();
        let mut t = Tarjan {
            edges,
            index: vec![None; n],
            lowlink: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            next_index: 0,
            components: Vec::new(),
        };
        for node in 0..n {
            if t.index[node].is_none() {
                t.connect(node);
            }
        }
        t.components
    }

    fn connect(&mut self, node: usize) {
        self.index[node] = Some(self.next_index);
        self.lowlink[node] = self.next_index;
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack[node] = true;

        for next in self.edges[node].iter().copied() {
            match self.index[next] {
                None => {
                    self.connect(next);
                    self.lowlink[node] = self.lowlink[node].min(self.lowlink[next]);
                }
                Some(idx) if self.on_stack[next] => {
                    self.lowlink[node] = self.lowlink[node].min(idx);
                }
                _ => (),
            }
        }

        if Some(self.lowlink[node]) == self.index[node] {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack[member] = false;
                component.push(member);
                if member == node {
                    break;
                }
            }
            self.components.push(component);
        }
    }
}

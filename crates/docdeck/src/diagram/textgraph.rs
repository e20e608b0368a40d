//! The built-in diagram renderer.
//!
//! Renders a small `graph` edge-list dialect to monospaced box-and-arrow
//! markup: node declarations (`api[API Gateway]`), edges (`a --> b`,
//! `a -> b`, `a -- b`, optional `: label`), `%%` comments, and an optional
//! `graph` header line. Layout is topological layering; the output is plain
//! text the slide renderer scales to full width.
//!
//! Rendering runs on a dedicated tokio worker pool and reports back through
//! the adapter's channel. The rest of the crate treats this module as an
//! opaque external collaborator: any renderer implementing
//! [`DiagramRenderer`] can replace it.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender, channel};

use super::{DiagramId, DiagramRenderer, RenderError, RenderOutcome};

pub struct TextGraphRenderer {
    runtime: tokio::runtime::Runtime,
    tx: Sender<RenderOutcome>,
}

impl TextGraphRenderer {
    /// Start the worker pool; the receiver feeds a `RendererAdapter`.
    pub fn spawn() -> anyhow::Result<(Self, Receiver<RenderOutcome>)> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("docdeck-diagram")
            .build()?;
        let (tx, rx) = channel();
        Ok((Self { runtime, tx }, rx))
    }
}

impl DiagramRenderer for TextGraphRenderer {
    fn submit(&self, id: DiagramId, source: String) {
        let tx = self.tx.clone();
        self.runtime.spawn_blocking(move || {
            let result = render_source(&source);
            if tx.send(RenderOutcome { id, result }).is_err() {
                tracing::debug!(id, "render outcome dropped, adapter gone");
            }
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum EdgeKind {
    Arrow,
    Dashed,
    Line,
}

struct Edge {
    from: usize,
    to: usize,
    kind: EdgeKind,
    label: Option<String>,
}

#[derive(Default)]
struct Graph {
    /// Node display labels, in declaration order.
    labels: Vec<String>,
    names: HashMap<String, usize>,
    edges: Vec<Edge>,
}

impl Graph {
    fn node(&mut self, name: &str, label: Option<String>) -> usize {
        if let Some(&index) = self.names.get(name) {
            if let Some(label) = label {
                self.labels[index] = label;
            }
            return index;
        }
        let index = self.labels.len();
        self.names.insert(name.to_string(), index);
        self.labels.push(label.unwrap_or_else(|| name.to_string()));
        index
    }
}

pub(crate) fn render_source(source: &str) -> Result<String, RenderError> {
    let graph = parse_source(source)?;
    if graph.labels.is_empty() {
        return Err(RenderError::Invalid("empty graph".to_string()));
    }
    let layers = layer_nodes(&graph)?;
    Ok(draw(&graph, &layers))
}

fn parse_source(source: &str) -> Result<Graph, RenderError> {
    let mut graph = Graph::default();
    for (line_no, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("%%") {
            continue;
        }
        if line_no == 0 || graph.labels.is_empty() {
            // Optional header: `graph`, `graph TD`, `graph LR`, ...
            if line == "graph" || line.starts_with("graph ") {
                continue;
            }
        }
        if parse_edge(&mut graph, line)? {
            continue;
        }
        if parse_node_decl(&mut graph, line) {
            continue;
        }
        return Err(RenderError::Invalid(format!(
            "unrecognized line {}: `{line}`",
            line_no + 1
        )));
    }
    Ok(graph)
}

/// `name[Label]` on its own line.
fn parse_node_decl(graph: &mut Graph, line: &str) -> bool {
    let Some((name, label)) = split_node_ref(line) else {
        return false;
    };
    if name.is_empty() || !is_identifier(name) {
        return false;
    }
    graph.node(name, label);
    true
}

fn parse_edge(graph: &mut Graph, line: &str) -> Result<bool, RenderError> {
    let (body, label) = match line.split_once(':') {
        Some((body, label)) => (body.trim(), Some(label.trim().to_string())),
        None => (line, None),
    };

    let (connector, kind) = if body.contains("-->") {
        ("-->", EdgeKind::Dashed)
    } else if body.contains("->") {
        ("->", EdgeKind::Arrow)
    } else if body.contains("--") {
        ("--", EdgeKind::Line)
    } else {
        return Ok(false);
    };

    let Some((lhs, rhs)) = body.split_once(connector) else {
        return Ok(false);
    };
    let Some((from_name, from_label)) = split_node_ref(lhs.trim()) else {
        return Err(RenderError::Invalid(format!("bad edge source in `{line}`")));
    };
    let Some((to_name, to_label)) = split_node_ref(rhs.trim()) else {
        return Err(RenderError::Invalid(format!("bad edge target in `{line}`")));
    };
    if !is_identifier(from_name) || !is_identifier(to_name) {
        return Err(RenderError::Invalid(format!("bad node name in `{line}`")));
    }

    let from = graph.node(from_name, from_label);
    let to = graph.node(to_name, to_label);
    graph.edges.push(Edge {
        from,
        to,
        kind,
        label,
    });
    Ok(true)
}

/// `name` or `name[Label]` → `(name, Some(label))`.
fn split_node_ref(text: &str) -> Option<(&str, Option<String>)> {
    if text.is_empty() {
        return None;
    }
    match text.split_once('[') {
        None => Some((text, None)),
        Some((name, rest)) => {
            let label = rest.strip_suffix(']')?;
            Some((name.trim(), Some(label.trim().to_string())))
        }
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Longest-path layering via Kahn's algorithm. A graph with edges but no
/// entry nodes is rejected; a cycle reached partway through is tolerated by
/// dumping the remainder into a final layer.
fn layer_nodes(graph: &Graph) -> Result<Vec<Vec<usize>>, RenderError> {
    let count = graph.labels.len();
    let mut indegree = vec![0usize; count];
    for edge in &graph.edges {
        if edge.from != edge.to {
            indegree[edge.to] += 1;
        }
    }

    let mut depth = vec![0usize; count];
    let mut queue: Vec<usize> = (0..count).filter(|&n| indegree[n] == 0).collect();
    if queue.is_empty() {
        return Err(RenderError::Invalid(
            "graph is fully cyclic, no entry nodes".to_string(),
        ));
    }

    let mut seen = vec![false; count];
    let mut head = 0;
    while head < queue.len() {
        let node = queue[head];
        head += 1;
        seen[node] = true;
        for edge in graph.edges.iter().filter(|e| e.from == node) {
            if edge.to == edge.from {
                continue;
            }
            depth[edge.to] = depth[edge.to].max(depth[node] + 1);
            indegree[edge.to] -= 1;
            if indegree[edge.to] == 0 {
                queue.push(edge.to);
            }
        }
    }

    let max_depth = depth.iter().copied().max().unwrap_or(0);
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); max_depth + 1];
    for node in 0..count {
        if seen[node] {
            layers[depth[node]].push(node);
        }
    }
    let leftovers: Vec<usize> = (0..count).filter(|&n| !seen[n]).collect();
    if !leftovers.is_empty() {
        layers.push(leftovers);
    }
    layers.retain(|layer| !layer.is_empty());
    Ok(layers)
}

fn draw(graph: &Graph, layers: &[Vec<usize>]) -> String {
    let mut out = String::new();

    for (i, layer) in layers.iter().enumerate() {
        let boxes: Vec<[String; 3]> = layer
            .iter()
            .map(|&node| draw_box(&graph.labels[node]))
            .collect();
        for row in 0..3 {
            let line: Vec<&str> = boxes.iter().map(|b| b[row].as_str()).collect();
            out.push_str(&line.join("   "));
            out.push('\n');
        }
        if i + 1 < layers.len() {
            out.push_str("      │\n      ▼\n");
        }
    }

    if !graph.edges.is_empty() {
        out.push('\n');
        for edge in &graph.edges {
            let connector = match edge.kind {
                EdgeKind::Arrow => "──▶",
                EdgeKind::Dashed => "╌╌▶",
                EdgeKind::Line => "───",
            };
            out.push_str(&format!(
                "{} {connector} {}",
                graph.labels[edge.from], graph.labels[edge.to]
            ));
            if let Some(label) = &edge.label {
                out.push_str(&format!("  ({label})"));
            }
            out.push('\n');
        }
    }

    out.trim_end().to_string()
}

fn draw_box(label: &str) -> [String; 3] {
    let width = label.chars().count() + 2;
    [
        format!("┌{}┐", "─".repeat(width)),
        format!("│ {label} │"),
        format!("└{}┘", "─".repeat(width)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_chain_renders_boxes_and_edges() {
        let markup = render_source("graph TD\na[Alpha] -> b[Beta]").expect("render");
        assert!(markup.contains("│ Alpha │"));
        assert!(markup.contains("│ Beta │"));
        assert!(markup.contains("Alpha ──▶ Beta"));
    }

    #[test]
    fn node_declarations_and_edge_labels() {
        let source = "api[API Gateway]\nstore[Data Store]\napi -> store: writes";
        let markup = render_source(source).expect("render");
        assert!(markup.contains("│ API Gateway │"));
        assert!(markup.contains("API Gateway ──▶ Data Store  (writes)"));
    }

    #[test]
    fn dashed_and_plain_connectors() {
        let markup = render_source("a --> b\nc -- d").expect("render");
        assert!(markup.contains("a ╌╌▶ b"));
        assert!(markup.contains("c ─── d"));
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let markup = render_source("%% layout\n\na -> b\n").expect("render");
        assert!(markup.contains("a ──▶ b"));
    }

    #[test]
    fn downstream_nodes_land_in_later_layers() {
        let markup = render_source("a -> b\nb -> c").expect("render");
        let a_pos = markup.find("│ a │").expect("a box");
        let c_pos = markup.find("│ c │").expect("c box");
        assert!(a_pos < c_pos);
    }

    #[test]
    fn unrecognized_line_is_an_error() {
        let error = render_source("a -> b\nwat?!").expect_err("must fail");
        assert!(matches!(error, RenderError::Invalid(_)));
        assert!(error.to_string().contains("line 2"));
    }

    #[test]
    fn fully_cyclic_graph_is_an_error() {
        let error = render_source("a -> b\nb -> a").expect_err("must fail");
        assert!(error.to_string().contains("cyclic"));
    }

    #[test]
    fn partial_cycle_is_tolerated() {
        let markup = render_source("start -> a\na -> b\nb -> a").expect("render");
        assert!(markup.contains("│ start │"));
        assert!(markup.contains("│ a │"));
    }

    #[test]
    fn empty_source_is_an_error() {
        assert!(render_source("").is_err());
        assert!(render_source("graph TD\n%% nothing").is_err());
    }
}

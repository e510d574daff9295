//! Learning-path planning over a knowledge graph.
//!
//! Two orderings are available:
//!
//! - **shortest**: Dijkstra from a start topic with edge cost `11 - weight`,
//!   so strong relations are cheap. Returns the path to the closest other
//!   topic, i.e. the "next best" topic to study.
//! - **ranked**: main topics first, then every topic adjacent to one of them
//!   ordered by total incident edge weight. Used for the timeline view.
//!
//! Both are deterministic: ties are broken by node insertion order.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use learnpath_types::{clamp_weight, KnowledgeGraph, PlanStrategy, PlannerSettings, MAX_WEIGHT};

/// Bonus that keeps main topics ahead of related ones.
const MAIN_TOPIC_SCORE: f64 = 100.0;

/// What the caller wants ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanRequest {
    /// Path from `start` to its closest neighbour.
    NextBest { start: String },
    /// Main topics followed by their neighbourhood.
    Timeline { main_topic_ids: Vec<String> },
}

/// Computes visiting orders over a [`KnowledgeGraph`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PathPlanner {
    strategy: PlanStrategy,
}

impl PathPlanner {
    /// Planner using the default strategy.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(strategy: PlanStrategy) -> Self {
        Self { strategy }
    }

    pub fn from_settings(settings: &PlannerSettings) -> Self {
        Self::with_strategy(settings.strategy)
    }

    /// Strategy used by [`PathPlanner::recommended`].
    pub fn strategy(&self) -> PlanStrategy {
        self.strategy
    }

    /// Build the request the configured strategy implies.
    ///
    /// The shortest strategy starts from `start` when given, else from the
    /// first main topic. With neither available it degrades to a timeline.
    pub fn request_for(&self, main_topic_ids: &[String], start: Option<&str>) -> PlanRequest {
        match self.strategy {
            PlanStrategy::Shortest => {
                match start.map(str::to_string).or_else(|| main_topic_ids.first().cloned()) {
                    Some(start) => PlanRequest::NextBest { start },
                    None => PlanRequest::Timeline {
                        main_topic_ids: Vec::new(),
                    },
                }
            }
            PlanStrategy::Ranked => PlanRequest::Timeline {
                main_topic_ids: main_topic_ids.to_vec(),
            },
        }
    }

    /// Order the graph with the configured strategy.
    pub fn recommended(
        &self,
        graph: &KnowledgeGraph,
        main_topic_ids: &[String],
        start: Option<&str>,
    ) -> Vec<String> {
        self.plan(graph, &self.request_for(main_topic_ids, start))
    }

    /// Dispatch on the request kind.
    pub fn plan(&self, graph: &KnowledgeGraph, request: &PlanRequest) -> Vec<String> {
        match request {
            PlanRequest::NextBest { start } => self.shortest_path(graph, start),
            PlanRequest::Timeline { main_topic_ids } => self.ranked_path(graph, main_topic_ids),
        }
    }

    /// Shortest path from `start_id` to the closest other reachable node.
    ///
    /// Empty when `start_id` is not in the graph, `[start_id]` when nothing
    /// else is reachable.
    pub fn shortest_path(&self, graph: &KnowledgeGraph, start_id: &str) -> Vec<String> {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(graph.nodes.len());
        for (i, node) in graph.nodes.iter().enumerate() {
            index.entry(node.id.as_str()).or_insert(i);
        }

        let Some(&start) = index.get(start_id) else {
            warn!(start = %start_id, "Start topic not in graph");
            return Vec::new();
        };

        let n = graph.nodes.len();
        let mut dist = vec![f64::INFINITY; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        let mut visited = vec![false; n];
        dist[start] = 0.0;

        // Linear selection keeps ties on insertion order; graphs are small.
        while let Some(u) = (0..n)
            .filter(|&i| !visited[i] && dist[i].is_finite())
            .min_by(|&a, &b| dist[a].total_cmp(&dist[b]).then(a.cmp(&b)))
        {
            visited[u] = true;

            for edge in graph.outgoing(&graph.nodes[u].id) {
                let Some(&v) = index.get(edge.target.as_str()) else {
                    continue;
                };
                let cost = MAX_WEIGHT + 1.0 - clamp_weight(edge.weight);
                let candidate = dist[u] + cost;
                if candidate < dist[v] {
                    dist[v] = candidate;
                    prev[v] = Some(u);
                }
            }
        }

        let target = (0..n)
            .filter(|&i| i != start && dist[i].is_finite())
            .min_by(|&a, &b| dist[a].total_cmp(&dist[b]).then(a.cmp(&b)));

        let Some(target) = target else {
            debug!(start = %start_id, "No other topic reachable");
            return vec![start_id.to_string()];
        };

        let mut path = vec![target];
        let mut current = target;
        while let Some(p) = prev[current] {
            path.push(p);
            current = p;
        }
        path.reverse();

        debug!(
            start = %start_id,
            target = %graph.nodes[target].id,
            cost = dist[target],
            "Shortest path found"
        );

        path.into_iter()
            .map(|i| graph.nodes[i].id.clone())
            .collect()
    }

    /// Main topics in input order, then their neighbours by descending
    /// summed edge weight.
    pub fn ranked_path(&self, graph: &KnowledgeGraph, main_topic_ids: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mains: Vec<&str> = main_topic_ids
            .iter()
            .map(String::as_str)
            .filter(|id| graph.contains_node(id))
            .filter(|id| seen.insert(*id))
            .collect();

        let main_set: HashSet<&str> = mains.iter().copied().collect();

        let mut adjacent: HashSet<&str> = HashSet::new();
        for link in &graph.links {
            if main_set.contains(link.source.as_str()) {
                adjacent.insert(link.target.as_str());
            }
            if main_set.contains(link.target.as_str()) {
                adjacent.insert(link.source.as_str());
            }
        }

        let mut placed: HashSet<&str> = main_set.clone();
        let mut others: Vec<(&str, f64)> = Vec::new();
        for node in &graph.nodes {
            let id = node.id.as_str();
            if adjacent.contains(id) && placed.insert(id) {
                others.push((id, incident_weight(graph, id)));
            }
        }
        others.sort_by(|a, b| b.1.total_cmp(&a.1));

        for id in &mains {
            debug!(
                topic_id = %id,
                score = MAIN_TOPIC_SCORE + incident_weight(graph, id),
                "Ranked main topic"
            );
        }

        mains
            .into_iter()
            .map(str::to_string)
            .chain(others.into_iter().map(|(id, _)| id.to_string()))
            .collect()
    }
}

/// Sum of incoming and outgoing edge weights.
fn incident_weight(graph: &KnowledgeGraph, id: &str) -> f64 {
    graph.incoming(id).map(|l| l.weight).sum::<f64>()
        + graph.outgoing(id).map(|l| l.weight).sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use learnpath_types::{Difficulty, GraphEdge, GraphNode, RelationType};

    fn graph(nodes: &[&str], links: &[(&str, &str, f64)]) -> KnowledgeGraph {
        KnowledgeGraph {
            nodes: nodes
                .iter()
                .map(|id| GraphNode::new(*id, id.to_uppercase(), Difficulty::Medium))
                .collect(),
            links: links
                .iter()
                .map(|(s, t, w)| GraphEdge::new(*s, *t, *w, RelationType::from_score(*w)))
                .collect(),
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_shortest_missing_start_is_empty() {
        let g = graph(&["a"], &[]);
        assert!(PathPlanner::new().shortest_path(&g, "zzz").is_empty());
        assert!(PathPlanner::new()
            .shortest_path(&KnowledgeGraph::new(), "a")
            .is_empty());
    }

    #[test]
    fn test_shortest_single_edge() {
        let g = graph(&["A", "B"], &[("A", "B", 10.0)]);
        assert_eq!(PathPlanner::new().shortest_path(&g, "A"), ids(&["A", "B"]));
    }

    #[test]
    fn test_shortest_isolated_start() {
        let g = graph(&["A", "B"], &[("B", "A", 9.0)]);
        assert_eq!(PathPlanner::new().shortest_path(&g, "A"), ids(&["A"]));
    }

    #[test]
    fn test_shortest_prefers_strong_relations() {
        // A->B costs 6, A->C costs 1
        let g = graph(&["A", "B", "C"], &[("A", "B", 5.0), ("A", "C", 10.0)]);
        assert_eq!(PathPlanner::new().shortest_path(&g, "A"), ids(&["A", "C"]));
    }

    #[test]
    fn test_shortest_ties_follow_insertion_order() {
        let g = graph(&["A", "C", "B"], &[("A", "B", 8.0), ("A", "C", 8.0)]);
        assert_eq!(PathPlanner::new().shortest_path(&g, "A"), ids(&["A", "C"]));
    }

    #[test]
    fn test_shortest_ignores_unknown_targets() {
        let mut g = graph(&["A", "B"], &[("A", "B", 4.0)]);
        g.links
            .push(GraphEdge::new("A", "ghost", 10.0, RelationType::Fundamental));
        assert_eq!(PathPlanner::new().shortest_path(&g, "A"), ids(&["A", "B"]));
    }

    #[test]
    fn test_shortest_multi_hop_predecessors() {
        // A->B->C is the only way to C; B is still closer so it is chosen.
        let g = graph(&["A", "B", "C"], &[("A", "B", 9.0), ("B", "C", 10.0)]);
        assert_eq!(PathPlanner::new().shortest_path(&g, "A"), ids(&["A", "B"]));
        assert_eq!(PathPlanner::new().shortest_path(&g, "B"), ids(&["B", "C"]));
    }

    #[test]
    fn test_ranked_mains_first_then_by_score() {
        let g = graph(
            &["m1", "m2", "x", "y", "z", "far"],
            &[
                ("m1", "x", 4.0),
                ("m1", "y", 9.0),
                ("m2", "y", 3.0),
                ("m2", "z", 6.0),
                ("z", "far", 10.0),
            ],
        );

        let path = PathPlanner::new().ranked_path(&g, &ids(&["m2", "m1"]));
        // y: 12, z: 6 + 10, x: 4; "far" is not adjacent to a main topic
        assert_eq!(path, ids(&["m2", "m1", "z", "y", "x"]));
    }

    #[test]
    fn test_ranked_skips_unknown_and_duplicate_mains() {
        let g = graph(&["m1", "x"], &[("m1", "x", 5.0)]);
        let path = PathPlanner::new().ranked_path(&g, &ids(&["ghost", "m1", "m1"]));
        assert_eq!(path, ids(&["m1", "x"]));
    }

    #[test]
    fn test_ranked_incoming_neighbours_count() {
        let g = graph(&["m1", "x"], &[("x", "m1", 5.0)]);
        let path = PathPlanner::new().ranked_path(&g, &ids(&["m1"]));
        assert_eq!(path, ids(&["m1", "x"]));
    }

    #[test]
    fn test_ranked_ties_follow_insertion_order() {
        let g = graph(&["m1", "b", "a"], &[("m1", "a", 5.0), ("m1", "b", 5.0)]);
        let path = PathPlanner::new().ranked_path(&g, &ids(&["m1"]));
        assert_eq!(path, ids(&["m1", "b", "a"]));
    }

    #[test]
    fn test_ranked_empty_graph() {
        assert!(PathPlanner::new()
            .ranked_path(&KnowledgeGraph::new(), &ids(&["m1"]))
            .is_empty());
    }

    #[test]
    fn test_plan_dispatch() {
        let g = graph(&["A", "B"], &[("A", "B", 10.0)]);
        let planner = PathPlanner::new();

        let next = planner.plan(
            &g,
            &PlanRequest::NextBest {
                start: "A".to_string(),
            },
        );
        assert_eq!(next, ids(&["A", "B"]));

        let timeline = planner.plan(
            &g,
            &PlanRequest::Timeline {
                main_topic_ids: ids(&["B"]),
            },
        );
        assert_eq!(timeline, ids(&["B", "A"]));
    }

    #[test]
    fn test_request_for_strategy() {
        let mains = ids(&["m1", "m2"]);

        let ranked = PathPlanner::with_strategy(PlanStrategy::Ranked);
        assert_eq!(
            ranked.request_for(&mains, Some("x")),
            PlanRequest::Timeline {
                main_topic_ids: mains.clone()
            }
        );

        let shortest = PathPlanner::with_strategy(PlanStrategy::Shortest);
        assert_eq!(
            shortest.request_for(&mains, None),
            PlanRequest::NextBest {
                start: "m1".to_string()
            }
        );
        assert_eq!(
            shortest.request_for(&mains, Some("m2")),
            PlanRequest::NextBest {
                start: "m2".to_string()
            }
        );
        assert_eq!(
            shortest.request_for(&[], None),
            PlanRequest::Timeline {
                main_topic_ids: Vec::new()
            }
        );
    }

    #[test]
    fn test_default_strategy_is_ranked() {
        assert_eq!(PathPlanner::new().strategy(), PlanStrategy::Ranked);
        let settings = PlannerSettings {
            strategy: PlanStrategy::Shortest,
        };
        assert_eq!(
            PathPlanner::from_settings(&settings).strategy(),
            PlanStrategy::Shortest
        );
    }

    #[test]
    fn test_request_serializes_with_kind_tag() {
        let json = serde_json::to_value(PlanRequest::NextBest {
            start: "A".to_string(),
        })
        .unwrap();
        assert_eq!(json["kind"], "next_best");
        assert_eq!(json["start"], "A");
    }
}

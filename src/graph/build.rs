use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::info;

use crate::dataset::Person;

use super::model::{GraphEdge, GraphNode, SocialGraph};

/// server id -> indices (into the people slice) of its members, ascending.
pub fn server_groups(people: &[Person]) -> HashMap<&str, Vec<usize>> {
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, person) in people.iter().enumerate() {
        for server in &person.servers {
            groups.entry(server.as_str()).or_default().push(index);
        }
    }
    groups
}

fn normalized(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Every unordered pair that co-occurs in at least one group, once.
/// Cost is the sum of squared group sizes.
pub fn candidate_pairs(groups: &HashMap<&str, Vec<usize>>) -> HashSet<(usize, usize)> {
    groups
        .par_iter()
        .fold(HashSet::new, |mut pairs, (_server, members)| {
            for (offset, &a) in members.iter().enumerate() {
                for &b in &members[offset + 1..] {
                    if a != b {
                        pairs.insert(normalized(a, b));
                    }
                }
            }
            pairs
        })
        .reduce(HashSet::new, |mut left, right| {
            if left.len() < right.len() {
                return right.into_iter().chain(left).collect();
            }
            left.extend(right);
            left
        })
}

#[derive(Clone, Copy, Debug, Default)]
pub struct OverlapGraphBuilder;

impl OverlapGraphBuilder {
    pub fn build(&self, people: &[Person]) -> SocialGraph {
        let nodes = people.iter().map(GraphNode::from_person).collect::<Vec<_>>();

        let groups = server_groups(people);
        let mut candidates = candidate_pairs(&groups).into_iter().collect::<Vec<_>>();
        candidates.sort_unstable();

        let edges = candidates
            .par_iter()
            .filter_map(|&(a, b)| {
                let weight = people[a].shared_servers(&people[b]);
                (weight > 0).then(|| GraphEdge::new(people[a].id.clone(), people[b].id.clone(), weight))
            })
            .collect::<Vec<_>>();

        info!(
            nodes = nodes.len(),
            servers = groups.len(),
            candidates = candidates.len(),
            edges = edges.len(),
            "overlap graph built"
        );

        SocialGraph { nodes, edges }
    }
}

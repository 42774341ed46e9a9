use tracing::info;

use crate::avatar::{AvatarResolver, ImageSource};
use crate::dataset::Person;
use crate::graph::{OverlapGraphBuilder, SocialGraph};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub people: usize,
    pub edges: usize,
    pub avatars: usize,
    pub fallback_avatars: usize,
    pub missing_avatars: usize,
}

/// Unresolved avatars leave the node without an image.
pub fn build_social_graph<S: ImageSource>(
    people: &[Person],
    resolver: &AvatarResolver<S>,
) -> (SocialGraph, PipelineReport) {
    let (graph, avatars) = rayon::join(
        || OverlapGraphBuilder.build(people),
        || resolver.resolve_all(people),
    );

    let mut report = PipelineReport {
        people: people.len(),
        edges: graph.edge_count(),
        ..PipelineReport::default()
    };
    for outcome in avatars.values() {
        match outcome {
            Ok(artifact) if artifact.fallback => report.fallback_avatars += 1,
            Ok(_) => report.avatars += 1,
            Err(_) => report.missing_avatars += 1,
        }
    }

    let graph = graph.with_images(|id| {
        avatars
            .get(id)
            .and_then(|outcome| outcome.as_ref().ok())
            .map(|artifact| artifact.path.clone())
    });

    info!(
        people = report.people,
        edges = report.edges,
        avatars = report.avatars,
        fallback = report.fallback_avatars,
        missing = report.missing_avatars,
        "social graph ready"
    );
    (graph, report)
}

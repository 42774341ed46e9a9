use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};

use image::{ImageFormat, Rgba, RgbaImage};
use serde_json::Value;
use tempfile::{NamedTempFile, TempDir};

use mutual_graph::avatar::{
    AvatarCache, AvatarResolver, FallbackAvatars, FetchError, ImageFetcher, ImageSource, Retry,
};
use mutual_graph::dataset::load_people;
use mutual_graph::export::{ExportOptions, GraphExport, JsonExport};
use mutual_graph::pipeline::build_social_graph;

const FALLBACK_BASE: &str = "https://fallback.test/embed/avatars";

#[derive(Default)]
struct FakeSource {
    responses: HashMap<String, Vec<u8>>,
    calls: AtomicU32,
}

impl FakeSource {
    fn serve(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.responses.insert(url.to_owned(), bytes);
        self
    }
}

impl ImageSource for FakeSource {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_owned(),
            status: 404,
        })
    }
}

fn square_png(size: u32) -> Vec<u8> {
    let mut encoded = Vec::new();
    RgbaImage::from_pixel(size, size, Rgba([200, 60, 60, 255]))
        .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
        .unwrap();
    encoded
}

fn dataset_file() -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        r#"{
          "1": {"name": "Ada", "avatar": "https://cdn.test/avatars/1/ada.png", "mutual": ["s1", "s2"]},
          "2": {"name": "Bo", "avatar": "https://cdn.test/avatars/2/gone.png", "mutual": ["s2", "s3"]},
          "3": {"name": "Cy", "avatar": "https://cdn.test/avatars/3/gone-too.png", "mutual": ["s4"]}
        }"#,
    )
    .unwrap();
    file
}

fn resolver(cache_dir: &TempDir, source: FakeSource) -> AvatarResolver<FakeSource> {
    AvatarResolver::new(
        ImageFetcher::new(source, Retry::default()),
        AvatarCache::open(cache_dir.path()).unwrap(),
        FallbackAvatars::new(FALLBACK_BASE, 5),
    )
}

#[test]
fn builds_graph_with_primary_fallback_and_missing_avatars() {
    let input = dataset_file();
    let cache_dir = TempDir::new().unwrap();
    let source = FakeSource::default()
        .serve("https://cdn.test/avatars/1/ada.png", square_png(16))
        .serve(&format!("{FALLBACK_BASE}/2.png"), square_png(12));

    let people = load_people(input.path()).unwrap();
    let resolver = resolver(&cache_dir, source);
    let (graph, report) = build_social_graph(&people, &resolver);

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.weight("1", "2"), Some(1));
    assert_eq!(graph.weight("1", "3"), None);

    assert_eq!(report.people, 3);
    assert_eq!(report.avatars, 1);
    assert_eq!(report.fallback_avatars, 1);
    assert_eq!(report.missing_avatars, 1);

    let ada = graph.node("1").unwrap();
    assert_eq!(ada.label, "Ada\n(2 mutual)");
    assert_eq!(ada.image.as_deref(), Some(cache_dir.path().join("circular_ada.png.png").as_path()));

    let bo = graph.node("2").unwrap();
    assert_eq!(bo.image.as_deref(), Some(cache_dir.path().join("circular_2.png.png").as_path()));

    let cy = graph.node("3").unwrap();
    assert!(cy.image.is_none());
    assert_eq!(cy.tooltip, "Mutual servers: 1");
}

#[test]
fn second_run_reuses_the_cache() {
    let input = dataset_file();
    let cache_dir = TempDir::new().unwrap();
    let people = load_people(input.path()).unwrap();

    let first = resolver(
        &cache_dir,
        FakeSource::default().serve("https://cdn.test/avatars/1/ada.png", square_png(16)),
    );
    build_social_graph(&people, &first);

    let second = resolver(&cache_dir, FakeSource::default());
    let (graph, _) = build_social_graph(&people, &second);

    assert!(graph.node("1").unwrap().image.is_some());
    // Only the two uncached people hit the network, each retrying both URLs.
    assert_eq!(second.fetcher().source().calls.load(Ordering::SeqCst), 2 * (3 + 3));
}

#[test]
fn cached_avatar_is_a_circle() {
    let input = dataset_file();
    let cache_dir = TempDir::new().unwrap();
    let people = load_people(input.path()).unwrap();
    let resolver = resolver(
        &cache_dir,
        FakeSource::default().serve("https://cdn.test/avatars/1/ada.png", square_png(16)),
    );

    let (graph, _) = build_social_graph(&people, &resolver);
    let path = graph.node("1").unwrap().image.clone().unwrap();
    let circular = image::open(path).unwrap().to_rgba8();

    assert_eq!(circular.dimensions(), (16, 16));
    assert_eq!(circular.get_pixel(0, 0)[3], 0);
    assert_eq!(circular.get_pixel(8, 8)[3], 255);
}

#[test]
fn json_export_contains_the_whole_graph() {
    let input = dataset_file();
    let cache_dir = TempDir::new().unwrap();
    let people = load_people(input.path()).unwrap();
    let (graph, _) = build_social_graph(&people, &resolver(&cache_dir, FakeSource::default()));

    let output = cache_dir.path().join("graph.json");
    JsonExport::new(&output)
        .export(&graph, &ExportOptions::default())
        .unwrap();

    let document: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(document["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(document["edges"][0]["source"], "1");
    assert_eq!(document["edges"][0]["target"], "2");
    assert_eq!(document["edges"][0]["weight"], 1);
    assert_eq!(document["options"]["physics"]["solver"], "forceAtlas2Based");
}

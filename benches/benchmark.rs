use aspect_cluster::cluster::dbscan::observations;
use aspect_cluster::cluster::similarity::SimilarityMatrix;
use aspect_cluster::{ClusterEngine, EngineConfig, ReviewAnalyzer};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

const ASPECTS: &[&str] = &["service", "food", "price", "environment", "location", "portion", "seafood", "staff"];
const INTENSITY: &[&str] = &["", "very ", "quite ", "really ", "not "];
const POLARITY: &[&str] = &["good", "slow", "cheap", "fresh", "attentive", "rude", "expensive", "delicious"];
const ZH: &[&str] = &["环境很好", "服务特别棒", "上菜有点慢", "价格太贵", "味道不错", "分量很少"];

/// Synthetic mixed-language review batch
fn synthetic_reviews(n: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            if rng.gen_bool(0.3) {
                ZH[rng.gen_range(0..ZH.len())].to_string()
            } else {
                let clauses = rng.gen_range(1..=3);
                (0..clauses)
                    .map(|_| {
                        format!(
                            "{} {}{}",
                            ASPECTS[rng.gen_range(0..ASPECTS.len())],
                            INTENSITY[rng.gen_range(0..INTENSITY.len())],
                            POLARITY[rng.gen_range(0..POLARITY.len())]
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        })
        .collect()
}

fn random_vectors(n: usize, dim: usize, seed: u64) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect()).collect()
}

fn pipeline_benchmark(c: &mut Criterion) {
    let analyzer = ReviewAnalyzer::new(EngineConfig::default()).expect("default config is valid");
    let mut group = c.benchmark_group("cluster_reviews");
    for n in [50usize, 200, 800] {
        let reviews = synthetic_reviews(n, 7);
        group.bench_with_input(BenchmarkId::from_parameter(n), &reviews, |b, reviews| {
            b.iter(|| analyzer.cluster_reviews(black_box(reviews)))
        });
    }
    group.finish();

    let reviews = synthetic_reviews(200, 11);
    c.bench_function("analyze_batch_200", |b| b.iter(|| analyzer.analyze_batch(black_box(&reviews))));
}

fn cluster_benchmark(c: &mut Criterion) {
    let engine = ClusterEngine::default();
    let mut group = c.benchmark_group("cluster_engine");
    for n in [100usize, 500, 1500] {
        let vectors = random_vectors(n, 100, 3);
        group.bench_with_input(BenchmarkId::new("similarity_matrix", n), &vectors, |b, vectors| {
            b.iter(|| SimilarityMatrix::from_vectors(black_box(vectors)))
        });
        let obs = observations(&vectors);
        group.bench_with_input(BenchmarkId::new("cluster_observations", n), &obs, |b, obs| {
            b.iter(|| engine.cluster_observations(black_box(obs)))
        });
    }
    group.finish();
}

criterion_group!(benches, pipeline_benchmark, cluster_benchmark);
criterion_main!(benches);

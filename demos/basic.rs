use aspect_cluster::{EngineConfig, ReviewAnalyzer};

fn main() {
    // build analyzer with built-in collaborators
    let analyzer = match ReviewAnalyzer::new(EngineConfig::default()) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            eprintln!("failed to build analyzer: {e}");
            return;
        }
    };

    let reviews: Vec<String> = [
        "Environment very good, service attentive!",
        "environment good, service very attentive",
        "Food okay",
        "service was slow and the seafood not fresh",
        "这家餐厅环境很好，服务态度特别棒",
        "上菜有点慢了，价格太贵",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    // core clustering
    let report = analyzer.cluster_reviews(&reviews);
    for record in &report.records {
        println!(
            "{:<28} {:>3} reviews {:>6.1}%  {:?}",
            record.representative, record.coverage, record.percentage, record.members
        );
    }

    // sentiment + templated summary (no generator configured)
    let batch = analyzer.analyze_batch(&reviews);
    println!("\n{}", batch.summary);
    match serde_json::to_string_pretty(&batch) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("serialization failed: {e}"),
    }
}

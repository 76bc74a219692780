/// Evaluation run demo
///
/// Indexes a small judged collection, ranks one query under both similarity
/// models and writes a precision/recall curve file per model.
///
/// Usage: cargo run --example evaluation_run [output_dir]

use std::path::PathBuf;
use chrono::NaiveDate;
use ranklab::core::config::Config;
use ranklab::core::engine::Engine;
use ranklab::core::types::{DocumentCollection, Judgment};
use ranklab::eval::metrics::{mean_interpolated_precision, STANDARD_RECALL_LEVELS};
use ranklab::eval::report::write_pr_curves;
use ranklab::scoring::scorer::SimilarityKind;

const QUERY: &str = "social multiplayer game";
const SEARCH_TASK: u32 = 18;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== ranklab evaluation run ===\n");

    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);

    // Step 1: Build the index
    println!("Step 1: Indexing documents...");
    let config = Config::from_json_str(r#"{ "index": { "range_field": "published" } }"#)?;
    let engine = Engine::new(config, collection()?)?;
    println!("  Indexed {} documents\n", engine.index().document_count());

    // Step 2: Rank under each model
    println!("Step 2: Ranking '{}'...", QUERY);
    let judgment = engine.judgment(QUERY, SEARCH_TASK);
    let mut batch = Vec::new();
    for kind in [SimilarityKind::VectorSpace, SimilarityKind::Bm25] {
        let ranked = engine.search_text(QUERY, kind)?;
        let report = engine.evaluate(kind, &ranked, &judgment);
        println!(
            "  {:<4} hits={} P={:.3} R={:.3} F1={:.3} AP={:.3}",
            report.similarity,
            report.total_hits,
            report.precision,
            report.recall,
            report.f1,
            report.average_precision
        );
        for doc in report.retrieved.iter().take(3) {
            println!("       {:>7.4}  {}", doc.score, doc.title);
        }
        batch.push((output_dir.join(format!("{}_results0.txt", kind.name())), report.pr_curve));
    }
    println!();

    // Step 3: Write the curves
    println!("Step 3: Writing PR curves to {}...", output_dir.display());
    for ((path, _), written) in batch.iter().zip(write_pr_curves(&batch)) {
        match written {
            Ok(()) => println!("  wrote {}", path.display()),
            Err(e) => println!("  {} failed: {}", path.display(), e),
        }
    }

    let curves: Vec<_> = batch.into_iter().map(|(_, curve)| curve).collect();
    let mean = mean_interpolated_precision(&curves, &STANDARD_RECALL_LEVELS);
    println!("\n  11-point interpolated precision (mean of both models):");
    for (level, precision) in STANDARD_RECALL_LEVELS.iter().zip(mean) {
        println!("    R={:.1}  P={:.3}", level, precision);
    }

    println!("\nDone!");
    Ok(())
}

fn collection() -> Result<DocumentCollection, Box<dyn std::error::Error>> {
    let rows = [
        ("Social games on mobile devices", "Multiplayer social gaming with friends", "2011-03-01", true),
        ("Designing multiplayer online games", "Game servers and latency", "2010-06-15", true),
        ("A social network study", "Friendship graphs in online communities", "2009-01-10", false),
        ("Cooking with children", "Recipes and pasta", "2012-09-30", false),
        ("Game theory for auctions", "Bidding strategies in multiplayer settings", "2013-02-02", false),
    ];

    let mut docs = DocumentCollection::new();
    for (title, abstract_, published, relevant) in rows {
        let published = NaiveDate::parse_from_str(published, "%Y-%m-%d")?;
        docs.add(|d| {
            d.with_text("title", title)
                .with_text("abstract", abstract_)
                .with_date("published", published)
                .with_judgment(Judgment::new(QUERY, SEARCH_TASK, relevant))
        });
    }
    Ok(docs)
}

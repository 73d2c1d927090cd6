use folio::{DocumentBuilder, DocumentFormat, FolioError, GeneratorConfig, RandomDocument};
use std::env;
use std::time::Instant;

/// Generates a random report and writes it to a directory.
fn main() -> Result<(), FolioError> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        eprintln!("Builds a random report with folio and writes every unit to a directory.");
        eprintln!();
        eprintln!("Usage: {} <latex|xhtml> <output-dir> [generator.json]", args[0]);
        eprintln!();
        eprintln!("The optional JSON file holds generator settings, e.g. {{\"seed\": 3, \"sections\": 6}}.");
        std::process::exit(1);
    }

    let format: DocumentFormat = args[1].parse()?;
    let output_dir = &args[2];
    let config: GeneratorConfig = match args.get(3) {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => GeneratorConfig::default(),
    };
    std::fs::create_dir_all(output_dir)?;

    let generator = RandomDocument::new(config);
    let workers = num_cpus::get();
    println!(
        "Building a {:?} report (seed {}) with {} worker(s)...",
        format, config.seed, workers
    );
    let start = Instant::now();
    let document = DocumentBuilder::new()
        .format(format)
        .workers(workers)
        .bibliography(generator.bibliography())
        .base_path(output_dir)
        .build()?;
    let output = generator.compose(document)?;

    println!(
        "Wrote {} unit(s) to {} in {:.2?} (generated {})",
        output.units.len(),
        output_dir,
        start.elapsed(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    for unit in &output.units {
        println!("  {}", unit);
    }
    Ok(())
}

//! Basic example demonstrating the safety report.
//!
//! This example shows how to:
//! 1. Simulate a trial where the drug raises event rates
//! 2. Load and aggregate the records once
//! 3. Compute the three views
//! 4. Examine the conclusion

use trial_safety::prelude::*;
use trial_safety::test::format_p_value;

fn main() -> Result<()> {
    println!("=== Trial Safety Example ===\n");

    // Simulate dose records and write them to disk
    let sim = SyntheticTrialConfig::drug_harm().with_participants(150).with_seed(7);
    let records = generate_trial(&sim)?;
    let path = std::env::temp_dir().join("trial_safety_example.csv");
    write_csv(&records, &path)?;

    println!("Simulated '{}' trial:", sim.name);
    println!("  Records:      {}", records.len());
    println!("  Per arm:      {}", sim.participants_per_arm);
    println!();

    // Load once, then compute views from the immutable table
    let config = AnalysisConfig::for_data(&path);
    let trial = LoadedTrial::load(&config)?;
    println!("Aggregated {} participants\n", trial.participants.len());

    let pipeline = AnalysisPipeline::new(config);
    let report = pipeline.run(&trial.participants)?;

    println!("{}", report.overview);

    println!("=== Per-Event Comparison ===\n");
    for comparison in &report.side_effects.events {
        println!(
            "  {:<28} {:>5.1}% vs {:>5.1}%  q = {}",
            comparison.event.label(),
            comparison.test.proportions[0] * 100.0,
            comparison.test.proportions[1] * 100.0,
            format_p_value(comparison.q_value)
        );
    }
    println!();

    println!("{}", report.conclusion);

    std::fs::remove_file(&path)?;
    Ok(())
}

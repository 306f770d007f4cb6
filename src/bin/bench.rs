//! Benchmark for end-to-end schedule generation.
//!
//! Run with: cargo run --release --bin bench

use shift_scheduling::demo_data::{self, DemoData};
use shift_scheduling::model::{ModelBuilder, Objective};
use shift_scheduling::service::ScheduleService;
use shift_scheduling::solver::SolverConfig;
use std::time::Instant;

fn main() {
    for demo in [DemoData::Small, DemoData::Large] {
        let config = match demo_data::generate(demo) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}: invalid demo data: {}", demo.as_str(), e);
                continue;
            }
        };

        println!("Benchmark: {}", demo.as_str());
        println!("  Employees: {}", config.num_employees());
        println!("  Days: {}", config.num_days());
        println!("  Holidays: {}", config.holiday_requests().len());

        for objective in [Objective::Feasibility, Objective::MinimiseOverstaffing] {
            let build_start = Instant::now();
            let model = match ModelBuilder::new(&config).with_objective(objective).build() {
                Ok(model) => model,
                Err(e) => {
                    eprintln!("  model construction failed: {}", e);
                    continue;
                }
            };
            let build_time = build_start.elapsed();

            let service = ScheduleService::new(SolverConfig::default_config().with_objective(objective));
            let generate_start = Instant::now();
            let result = service.generate(&config);
            let generate_time = generate_start.elapsed();

            println!();
            println!("  Objective: {:?}", objective);
            println!("    Variables: {}", model.variable_count());
            println!("    Constraints: {}", model.constraint_count());
            println!("    Model build (standalone): {:.2?}", build_time);
            println!("    Generate (build + solve + format): {:.2?}", generate_time);
            println!("      of which solver: {:.2?}", result.elapsed);
            println!("    Status: {}", result.status.as_str());
            if let Some(value) = result.objective {
                println!("    Overstaffing: {}", value);
            }
        }
        println!();
    }
}

use kurbo::Point;
use turnkit::*;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let operation = args.get(1).map(|s| s.as_str()).unwrap_or("flat");

    match operation {
        "flat" => demo_flat(),
        "grooved" => demo_grooved(),
        "back" => demo_back_turning(),
        _ => {
            println!("Usage: turnkit [flat|grooved|back]");
            println!("  flat     - Rebuild passes over a flat section profile (default)");
            println!("  grooved  - Rebuild passes over a profile with a raised boss");
            println!("  back     - Emit the back-side closing chains");
        }
    }
}

fn polyline(points: &[(f64, f64)]) -> FeatureChain {
    let pts: Vec<Point> = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
    FeatureChain::from_points(&pts)
}

fn run(profile: FeatureChain, config: &TurningConfig) {
    let mut host = FixtureHost::single(profile);
    let mut doc = Document::new();
    match rebuild_turning_profiles(&mut doc, &mut host, &AnalyticKernel, config) {
        Ok(state) => {
            println!(
                "{} passes at depth {:.3} (lower Y {:.3}, high Y {:.3})\n",
                state.turning_times, state.turning_depth, state.lower_y, state.high_y
            );
            for entry in doc.entries() {
                println!(
                    "{:<24} [{}] {} elements, length {:.3}",
                    entry.label.to_string(),
                    entry.layer,
                    entry.chain.count(),
                    entry.chain.length()
                );
            }
        }
        Err(e) => eprintln!("Error: {e:#}"),
    }
}

fn demo_flat() {
    println!("turnkit - flat section profile");
    println!("==============================\n");

    let config = TurningConfig {
        bar_diameter: 20.0,
        turning_depth: 1.0,
        turning_extend: 2.0,
        ..TurningConfig::default()
    };
    run(polyline(&[(12.0, 0.0), (2.0, 0.0), (-2.0, 0.0)]), &config);
}

fn demo_grooved() {
    println!("turnkit - profile with a raised boss");
    println!("====================================\n");

    let config = TurningConfig {
        bar_diameter: 8.0,
        turning_depth: 1.0,
        turning_extend: 2.0,
        ..TurningConfig::default()
    };
    run(
        polyline(&[
            (12.0, 1.0),
            (10.0, 1.0),
            (9.0, 6.0),
            (7.0, 6.0),
            (6.0, 1.0),
            (2.0, 1.0),
            (-1.0, 1.0),
        ]),
        &config,
    );
}

fn demo_back_turning() {
    println!("turnkit - back-side closing chains");
    println!("==================================\n");

    let config = TurningConfig {
        bar_diameter: 10.0,
        back_turn: 2.0,
        turning_extend: 3.0,
        ..TurningConfig::default()
    };
    let state = TurningState {
        turning_times: 3,
        turning_depth: 1.0,
        lower_y: 1.0,
        end_x_value: 8.0,
        ..TurningState::default()
    };
    let mut doc = Document::new();
    back_turning_chains(&mut doc, &config, &state);
    for entry in doc.entries() {
        let (Some(start), Some(end)) = (
            entry.chain.extremity(Extremity::Start),
            entry.chain.extremity(Extremity::End),
        ) else {
            continue;
        };
        println!(
            "{:<16} from ({:.3}, {:.3}) to ({:.3}, {:.3})",
            entry.label.to_string(),
            start.x,
            start.y,
            end.x,
            end.y
        );
    }
}

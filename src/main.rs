use graspgen::physics::{GraspRule, MockPhysicsBackend};
use graspgen::utils::config::SimulationConfig;
use graspgen::{GraspSession, ObjectShape};

fn usage(program: &str) {
    eprintln!(
        "Usage: {} [--iterations N] [--object cube|cylinder] [--seed N] \
         [--config FILE] [--output FILE] [--pace]",
        program
    );
    eprintln!("  --iterations N   number of grasp attempts to run (default 100)");
    eprintln!("  --object SHAPE   object shape to grasp (default cube)");
    eprintln!("  --seed N         RNG seed for reproducible sampling");
    eprintln!("  --config FILE    load a JSON configuration file");
    eprintln!("  --output FILE    CSV output path (default <shape>-grasp-data.csv)");
    eprintln!("  --pace           pace ticks at the simulation timestep rate");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.get(0).map_or("graspgen", |s| s.as_str()).to_string();

    let mut iterations: usize = 100;
    let mut config = SimulationConfig::default();
    let mut output: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--iterations" => {
                i += 1;
                iterations = args
                    .get(i)
                    .ok_or("--iterations needs a value")?
                    .parse::<usize>()?;
            }
            "--object" => {
                i += 1;
                config.object.shape = match args.get(i).map(|s| s.as_str()) {
                    Some("cube") => ObjectShape::Cube,
                    Some("cylinder") => ObjectShape::Cylinder,
                    other => {
                        return Err(format!("unknown object shape: {:?}", other).into());
                    }
                };
            }
            "--seed" => {
                i += 1;
                let seed = args.get(i).ok_or("--seed needs a value")?.parse::<u64>()?;
                config.sampling.seed = Some(seed);
            }
            "--config" => {
                i += 1;
                let path = args.get(i).ok_or("--config needs a value")?;
                config = SimulationConfig::load(path)?;
            }
            "--output" => {
                i += 1;
                output = Some(args.get(i).ok_or("--output needs a value")?.clone());
            }
            "--pace" => {
                config.script.pacing = true;
            }
            "--help" | "-h" => {
                usage(&program);
                return Ok(());
            }
            other => {
                eprintln!("unknown argument: {}", other);
                usage(&program);
                return Err("invalid arguments".into());
            }
        }
        i += 1;
    }

    let output = output.unwrap_or_else(|| {
        let shape = match config.object.shape {
            ObjectShape::Cube => "cube",
            ObjectShape::Cylinder => "cylinder",
        };
        format!("{}-grasp-data.csv", shape)
    });

    // The built-in kinematic backend: capture reach is tied to the sampling
    // radius so both outcome labels occur in the generated data
    let rule = GraspRule {
        capture_radius: config.sampling.radius * 0.9,
        ..GraspRule::default()
    };
    let backend = MockPhysicsBackend::new().with_grasp_rule(rule);

    let mut session = GraspSession::new(Box::new(backend), config)?;
    session.run(iterations)?;

    let dataset = session.into_dataset();
    dataset.write_csv(&output)?;

    println!("Wrote {} attempts to {}", dataset.len(), output);
    if let Some(rate) = dataset.success_rate() {
        println!("Success rate: {:.1}%", rate * 100.0);
    }

    Ok(())
}

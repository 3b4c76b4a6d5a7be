use clap::{Parser, Subcommand};
use routine_core::*;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "routinely")]
#[command(about = "Workout routine composition system", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and save a new routine from catalog exercise ids
    New {
        name: String,

        /// Exercises to add, in order (e.g. bench_press barbell_row)
        exercises: Vec<String>,

        /// Mark as a rest day (may have zero exercises)
        #[arg(long)]
        rest_day: bool,
    },

    /// List saved routines
    List,

    /// Show one routine in full
    Show { id: Uuid },

    /// Insert an exercise into a routine
    Add {
        id: Uuid,
        exercise: String,

        /// Position to insert at (defaults to the end)
        #[arg(long)]
        at: Option<usize>,
    },

    /// Remove the exercise at a position
    Remove { id: Uuid, index: usize },

    /// Move an exercise to a new position
    Move { id: Uuid, from: usize, to: usize },

    /// Group a contiguous run of exercises into a superset or circuit
    Group {
        id: Uuid,

        /// Positions to group, ascending and adjacent (e.g. 0 1)
        indices: Vec<usize>,

        /// Rounds each member starts with
        #[arg(long, default_value_t = 3)]
        rounds: usize,

        /// Form a timed circuit instead of a superset
        #[arg(long)]
        circuit: bool,

        /// Circuit cadence in seconds per member slot
        #[arg(long, default_value_t = 60, requires = "circuit")]
        cadence: u32,
    },

    /// Dissolve the group containing the exercise at a position
    Ungroup { id: Uuid, index: usize },

    /// Add or remove one round across the group at a position
    Rounds {
        id: Uuid,
        index: usize,

        #[arg(long, conflicts_with = "remove")]
        add: bool,

        #[arg(long, conflicts_with = "add")]
        remove: bool,
    },

    /// Write one metric target onto every set of an exercise
    SetMetric {
        id: Uuid,
        index: usize,

        /// One of: reps, weight, duration, distance, rest, tempo
        metric: String,

        /// Target: exact ("8"), range ("8-12"), min-plus ("5+"), or
        /// percent-of-max ("75%")
        value: String,

        /// Unit of the entered value (weights normalize to kg)
        #[arg(long)]
        unit: Option<String>,
    },

    /// Print the advisory duration estimate for a routine
    Estimate { id: Uuid },

    /// List the exercise catalog
    Catalog,
}

fn main() -> ExitCode {
    routine_core::logging::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let repo = JsonDirRepository::new(data_dir.join("routines"));

    match cli.command {
        Commands::New {
            name,
            exercises,
            rest_day,
        } => cmd_new(&repo, &config, name, exercises, rest_day),
        Commands::List => cmd_list(&repo),
        Commands::Show { id } => cmd_show(&repo, &config, id),
        Commands::Add { id, exercise, at } => edit(&repo, &config, id, |engine| {
            let definition = resolve_exercise(&exercise)?;
            let at = at.unwrap_or(engine.routine().entries.len());
            engine.insert_exercise(definition, at)?;
            Ok(())
        }),
        Commands::Remove { id, index } => edit(&repo, &config, id, |engine| {
            engine.remove_exercise(index)?;
            Ok(())
        }),
        Commands::Move { id, from, to } => edit(&repo, &config, id, |engine| {
            engine.reorder_exercise(from, to)?;
            Ok(())
        }),
        Commands::Group {
            id,
            indices,
            rounds,
            circuit,
            cadence,
        } => edit(&repo, &config, id, |engine| {
            let kind = if circuit {
                GroupKind::CircuitTimed {
                    cadence_seconds: cadence,
                }
            } else {
                GroupKind::Standard
            };
            // Each member is seeded from its current first set
            let seeds: Vec<Vec<MetricTarget>> = indices
                .iter()
                .map(|&i| {
                    engine
                        .routine()
                        .entries
                        .get(i)
                        .and_then(|e| e.sets.get(0))
                        .map(|s| s.targets.clone())
                        .unwrap_or_default()
                })
                .collect();
            engine.group_selection(&indices, kind, &seeds, rounds)?;
            Ok(())
        }),
        Commands::Ungroup { id, index } => edit(&repo, &config, id, |engine| {
            let group_id = group_at(engine.routine(), index)?;
            engine.ungroup(group_id)?;
            Ok(())
        }),
        Commands::Rounds {
            id,
            index,
            add,
            remove,
        } => edit(&repo, &config, id, |engine| {
            let group_id = group_at(engine.routine(), index)?;
            if add {
                engine.add_round(group_id)?;
            } else if remove {
                engine.remove_round(group_id)?;
            } else {
                return Err(Error::InvalidCommand(
                    "pass --add or --remove".into(),
                ));
            }
            Ok(())
        }),
        Commands::SetMetric {
            id,
            index,
            metric,
            value,
            unit,
        } => edit(&repo, &config, id, |engine| {
            let metric = parse_metric(&metric)?;
            let mut target = parse_target(&value)?;
            if let Some(unit) = unit {
                target = normalize_target(target, metric, &unit)?;
            }
            engine.bulk_apply_metric(index, metric, target)?;
            Ok(())
        }),
        Commands::Estimate { id } => cmd_estimate(&repo, &config, id),
        Commands::Catalog => cmd_catalog(),
    }
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_new(
    repo: &JsonDirRepository,
    config: &Config,
    name: String,
    exercises: Vec<String>,
    rest_day: bool,
) -> Result<()> {
    let mut routine = Routine::new(name);
    routine.rest_day = rest_day;

    let mut engine = CompositionEngine::new(routine, config);
    for (i, exercise) in exercises.iter().enumerate() {
        engine.insert_exercise(resolve_exercise(exercise)?, i)?;
    }

    let saved = engine.save_to(repo)?;
    println!(
        "Created routine '{}' ({})",
        saved.name,
        saved.id.map(|id| id.to_string()).unwrap_or_default()
    );
    Ok(())
}

fn cmd_list(repo: &JsonDirRepository) -> Result<()> {
    let summaries = repo.list()?;
    if summaries.is_empty() {
        println!("No routines saved yet.");
        return Ok(());
    }
    for summary in summaries {
        let kind = if summary.rest_day { "rest day" } else { "workout" };
        println!(
            "{}  {}  ({}, {} exercises)",
            summary.id, summary.name, kind, summary.exercise_count
        );
    }
    Ok(())
}

fn cmd_show(repo: &JsonDirRepository, config: &Config, id: Uuid) -> Result<()> {
    let routine = load(repo, id)?;
    let engine = CompositionEngine::new(routine, config);
    print_routine(&engine);
    Ok(())
}

fn cmd_estimate(repo: &JsonDirRepository, config: &Config, id: Uuid) -> Result<()> {
    let routine = load(repo, id)?;
    let engine = CompositionEngine::new(routine, config);
    let seconds = engine.estimate_duration();
    println!("Estimated duration: {} seconds (~{} min)", seconds, seconds / 60);
    Ok(())
}

fn cmd_catalog() -> Result<()> {
    let catalog = get_default_catalog();
    let mut exercises: Vec<_> = catalog.exercises.values().collect();
    exercises.sort_by(|a, b| a.id.cmp(&b.id));

    for exercise in exercises {
        let kind = if exercise.cardio { "cardio" } else { "strength" };
        println!("{:<18} {}  [{}]", exercise.id, exercise.name, kind);
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Load a routine, run one edit session over it, save the result
fn edit<F>(repo: &JsonDirRepository, config: &Config, id: Uuid, apply: F) -> Result<()>
where
    F: FnOnce(&mut CompositionEngine) -> Result<()>,
{
    let routine = load(repo, id)?;
    let mut engine = CompositionEngine::new(routine, config);
    apply(&mut engine)?;
    engine.save_to(repo)?;
    print_routine(&engine);
    Ok(())
}

fn load(repo: &JsonDirRepository, id: Uuid) -> Result<Routine> {
    repo.load(id)?
        .ok_or_else(|| Error::InvalidCommand(format!("no routine with id {}", id)))
}

fn group_at(routine: &Routine, index: usize) -> Result<Uuid> {
    routine.group_at(index).ok_or_else(|| {
        Error::InvalidCommand(format!("exercise at position {} is not grouped", index))
    })
}

fn resolve_exercise(id: &str) -> Result<&'static ExerciseDefinition> {
    get_default_catalog()
        .get(id)
        .ok_or_else(|| Error::UnknownExercise(id.to_string()))
}

fn parse_metric(s: &str) -> Result<Metric> {
    match s.to_lowercase().as_str() {
        "reps" => Ok(Metric::Reps),
        "weight" => Ok(Metric::Weight),
        "duration" => Ok(Metric::Duration),
        "distance" => Ok(Metric::Distance),
        "rest" => Ok(Metric::Rest),
        "tempo" => Ok(Metric::Tempo),
        other => Err(Error::InvalidCommand(format!("unknown metric '{}'", other))),
    }
}

/// Parse "8", "8-12", "5+" or "75%" into a target value
fn parse_target(s: &str) -> Result<TargetValue> {
    let s = s.trim();
    let number = |text: &str| -> Result<f64> {
        text.parse::<f64>()
            .map_err(|_| Error::InvalidCommand(format!("invalid target value '{}'", s)))
    };

    if let Some(percent) = s.strip_suffix('%') {
        return Ok(TargetValue::PercentOfMax {
            percent: number(percent)?,
        });
    }
    if let Some(min) = s.strip_suffix('+') {
        return Ok(TargetValue::MinPlus { min: number(min)? });
    }
    if let Some((min, max)) = s.split_once('-') {
        return Ok(TargetValue::Range {
            min: number(min)?,
            max: number(max)?,
        });
    }
    Ok(TargetValue::exact(number(s)?))
}

/// Normalize a user-entered value into the canonical storage unit
fn normalize_target(target: TargetValue, metric: Metric, unit: &str) -> Result<TargetValue> {
    let unit: Unit = unit.parse()?;
    let canonical = unit.canonical();
    let converted = match target {
        TargetValue::Exact { value } => TargetValue::Exact {
            value: convert(value, unit, canonical)?,
        },
        TargetValue::Range { min, max } => TargetValue::Range {
            min: convert(min, unit, canonical)?,
            max: convert(max, unit, canonical)?,
        },
        TargetValue::MinPlus { min } => TargetValue::MinPlus {
            min: convert(min, unit, canonical)?,
        },
        // Percentages are unit-less
        TargetValue::PercentOfMax { percent } => TargetValue::PercentOfMax { percent },
    };
    tracing::debug!("Normalized {:?} {} to canonical {}", metric, unit, canonical);
    Ok(converted)
}

fn print_routine(engine: &CompositionEngine) {
    let routine = engine.routine();
    let kind = if routine.rest_day { " (rest day)" } else { "" };
    println!("{}{}", routine.name, kind);

    if let Some(notes) = &routine.notes {
        println!("  {}", notes);
    }

    for (i, entry) in routine.entries.iter().enumerate() {
        let marker = match &entry.group {
            None => String::new(),
            Some(m) => match m.kind {
                GroupKind::Standard => format!("  [superset #{}]", m.order + 1),
                GroupKind::CircuitTimed { cadence_seconds } => {
                    format!("  [circuit #{} @ {}s]", m.order + 1, cadence_seconds)
                }
            },
        };
        println!("{:>3}. {}{}", i, entry.exercise_id, marker);

        for (s, set) in entry.sets.iter().enumerate() {
            let targets: Vec<String> = set
                .targets
                .iter()
                .map(|t| format!("{:?} {}", t.metric, format_value(&t.value)))
                .collect();
            println!("       set {}: {}", s + 1, targets.join(", "));
        }
    }

    println!(
        "Estimated duration: ~{} min",
        engine.estimate_duration() / 60
    );
}

fn format_value(value: &TargetValue) -> String {
    match value {
        TargetValue::Exact { value } => format!("{}", value),
        TargetValue::Range { min, max } => format!("{}-{}", min, max),
        TargetValue::MinPlus { min } => format!("{}+", min),
        TargetValue::PercentOfMax { percent } => format!("{}%", percent),
    }
}

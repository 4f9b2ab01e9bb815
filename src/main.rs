use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use treestep::animation::Step;
use treestep::{BinaryTree, NodeId, Operation, Session, SessionConfig, StepRenderer, Value};

#[derive(Parser, Debug)]
#[command(
    name = "treestep",
    about = "Run search tree and heap algorithms step by step"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print every step as it completes.
    #[arg(long, global = true)]
    trace: bool,

    /// Seed for random trees and heaps.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Duration of a timed step in milliseconds.
    #[arg(long, global = true, default_value_t = 650.0)]
    step_ms: f64,

    /// Movement speed in pixels per millisecond.
    #[arg(long, global = true, default_value_t = 0.25)]
    speed: f64,

    /// Debug logging to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Binary search tree operations.
    ///
    /// Tokens: random:MIN:MAX, insert:V, find:V, delete:V, max[:V], min[:V],
    /// pred:V, succ:V, preorder, inorder, postorder
    Bst {
        /// Operations, applied in order.
        #[arg(required = true)]
        ops: Vec<String>,
    },
    /// Binary max-heap operations.
    ///
    /// Tokens: random:MIN:MAX, build:V,V,..., insert:V, delete:I, extract,
    /// max, sort (I is a positional index)
    Heap {
        /// Operations, applied in order.
        #[arg(required = true)]
        ops: Vec<String>,
    },
}

/// How a command names its target node
#[derive(Debug, Clone, Copy)]
enum TargetRef {
    Value(Value),
    Index(usize),
}

#[derive(Debug)]
struct Planned {
    op: Operation,
    target: Option<TargetRef>,
}

impl Planned {
    fn new(op: Operation) -> Self {
        Self { op, target: None }
    }

    fn at(op: Operation, target: TargetRef) -> Self {
        Self {
            op,
            target: Some(target),
        }
    }
}

/// Prints each completed step
struct TraceRenderer {
    completed: usize,
}

impl StepRenderer for TraceRenderer {
    fn complete(&mut self, step: &Step) {
        self.completed += 1;
        println!(
            "    {:>4} {:>7.1}ms  {:?}",
            self.completed, step.duration_ms, step.action
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = SessionConfig::default()
        .with_step_duration(cli.step_ms)
        .context("invalid --step-ms")?
        .with_move_speed(cli.speed)
        .context("invalid --speed")?
        .with_continuous(false);
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    let planned = match &cli.command {
        Commands::Bst { ops } => ops
            .iter()
            .map(|t| parse_bst(t))
            .collect::<Result<Vec<_>>>()?,
        Commands::Heap { ops } => ops
            .iter()
            .map(|t| parse_heap(t))
            .collect::<Result<Vec<_>>>()?,
    };

    let mut session = Session::new(config).context("failed to start session")?;
    for step in planned {
        run_planned(&mut session, step, cli.trace)?;
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_planned(session: &mut Session, planned: Planned, trace: bool) -> Result<()> {
    let target = match planned.target {
        Some(target) => Some(resolve(session.tree(), target)?),
        None => None,
    };
    let name = planned.op.name();
    let outcome = session
        .submit(planned.op, target)
        .with_context(|| format!("{name} failed"))?;

    let label = session
        .history()
        .current_unit()
        .map(|u| u.to_string())
        .unwrap_or_default();
    let timeline = session.timeline();
    println!("{label}");
    println!("  result   {outcome}");
    println!("  tree     {}", session.tree());
    println!(
        "  timeline {} steps, {:.0}ms, {}",
        timeline.len(),
        timeline.total_duration_ms(),
        &timeline.fingerprint().to_hex()[..16]
    );

    if trace {
        let mut renderer = TraceRenderer { completed: 0 };
        session.run_to_end(&mut renderer)?;
    } else {
        session.skip_forward(&mut ());
    }
    Ok(())
}

fn resolve(tree: &BinaryTree<Value>, target: TargetRef) -> Result<NodeId> {
    match target {
        TargetRef::Value(v) => tree
            .preorder()
            .find(|&n| tree.value(n) == Some(&v))
            .ok_or_else(|| anyhow!("no node holds {v}")),
        TargetRef::Index(i) => tree
            .node_at(i)
            .ok_or_else(|| anyhow!("no node at positional index {i}")),
    }
}

fn split(token: &str) -> (&str, Option<&str>) {
    match token.split_once(':') {
        Some((name, rest)) => (name, Some(rest)),
        None => (token, None),
    }
}

fn number<T: std::str::FromStr>(token: &str, arg: Option<&str>) -> Result<T> {
    let arg = arg.ok_or_else(|| anyhow!("{token}: missing argument"))?;
    arg.trim()
        .parse()
        .map_err(|_| anyhow!("{token}: cannot parse {arg:?}"))
}

fn range(token: &str, arg: Option<&str>) -> Result<(Value, Value)> {
    let arg = arg.ok_or_else(|| anyhow!("{token}: expected MIN:MAX"))?;
    let (min, max) = arg
        .split_once(':')
        .ok_or_else(|| anyhow!("{token}: expected MIN:MAX"))?;
    Ok((number(token, Some(min))?, number(token, Some(max))?))
}

fn parse_bst(token: &str) -> Result<Planned> {
    let (name, arg) = split(token);
    let by_value = |op: Operation| -> Result<Planned> {
        Ok(Planned::at(op, TargetRef::Value(number(token, arg)?)))
    };
    Ok(match name {
        "random" => {
            let (min, max) = range(token, arg)?;
            Planned::new(Operation::RandomBsTree { min, max })
        }
        "insert" => Planned::new(Operation::BstInsert(number(token, arg)?)),
        "find" => Planned::new(Operation::BstFind(number(token, arg)?)),
        "delete" => by_value(Operation::BstDelete)?,
        "pred" => by_value(Operation::BstPredecessor)?,
        "succ" => by_value(Operation::BstSuccessor)?,
        "max" if arg.is_none() => Planned::new(Operation::BstGetMax),
        "max" => by_value(Operation::BstGetMax)?,
        "min" if arg.is_none() => Planned::new(Operation::BstGetMin),
        "min" => by_value(Operation::BstGetMin)?,
        "preorder" => Planned::new(Operation::PreorderArray),
        "inorder" => Planned::new(Operation::InorderArray),
        "postorder" => Planned::new(Operation::PostorderArray),
        _ => bail!("unknown search tree operation {token:?}"),
    })
}

fn parse_heap(token: &str) -> Result<Planned> {
    let (name, arg) = split(token);
    let by_index = |op: Operation| -> Result<Planned> {
        Ok(Planned::at(op, TargetRef::Index(number(token, arg)?)))
    };
    Ok(match name {
        "random" => {
            let (min, max) = range(token, arg)?;
            Planned::new(Operation::RandomHeap { min, max })
        }
        "build" => {
            let values = match arg {
                Some(list) if !list.trim().is_empty() => list
                    .split(',')
                    .map(|v| number(token, Some(v)))
                    .collect::<Result<Vec<Value>>>()?,
                _ => Vec::new(),
            };
            Planned::new(Operation::BuildHeap(values))
        }
        "insert" => Planned::new(Operation::HeapInsert(number(token, arg)?)),
        "delete" => by_index(Operation::HeapDelete)?,
        "extract" => Planned::new(Operation::ExtractMax),
        "max" => Planned::new(Operation::HeapGetMax),
        "sort" => Planned::new(Operation::HeapSort),
        _ => bail!("unknown heap operation {token:?}"),
    })
}

use crate::error::IrError;
use crate::ir::Node;
use clap::Arg;
use clap::ArgAction;
use std::env::ArgsOs;
use std::fmt;
use std::fmt::Display;
use tracing::debug;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;
use tracing_subscriber;

/// A named transformation pass (e.g., `--fold-constants`).
pub struct SinglePass {
    pass: String,
}

impl Display for SinglePass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pass)
    }
}

impl SinglePass {
    pub fn new(pass: &str) -> SinglePass {
        let pass = pass.strip_prefix("--").unwrap_or(pass);
        SinglePass {
            pass: pass.to_string(),
        }
    }
    pub fn name(&self) -> &str {
        &self.pass
    }
}

/// A collection of [SinglePass]es, applied in order.
pub struct Passes {
    passes: Vec<SinglePass>,
}

impl Display for Passes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.passes
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<String>>()
                .join(" ")
        )
    }
}

impl Passes {
    pub fn from_vec(passes: Vec<&str>) -> Passes {
        Passes {
            passes: passes.iter().map(|p| SinglePass::new(p)).collect(),
        }
    }
    /// Extract the passes named in `known` from the given CLI args, keeping
    /// the order in which they appear on the command line.
    pub fn from_args(args: ArgsOs, known: &[&str]) -> Passes {
        let mut passes = vec![];
        for arg in args {
            let arg = arg.to_string_lossy();
            let name = arg.strip_prefix("--").unwrap_or(&arg);
            if known.contains(&name) {
                passes.push(SinglePass::new(name));
            }
        }
        Passes { passes }
    }
    pub fn vec(&self) -> &Vec<SinglePass> {
        &self.passes
    }
}

/// Interface through which a toolchain exposes its passes to the pipeline.
pub trait PassDispatch {
    fn dispatch(root: &Node, pass: &SinglePass) -> Result<Node, IrError>;
}

/// Initialize logging with the given level.
pub fn init_subscriber(level: Level) -> Result<(), SetGlobalDefaultError> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_test_writer()
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}

/// Build CLI arguments for the given `(name, help)` pass descriptions, for
/// toolchains that drive the pipeline from a `clap` command.
pub fn pass_arguments(passes: &[(&'static str, &'static str)]) -> Vec<Arg> {
    passes
        .iter()
        .map(|(name, help)| {
            Arg::new(*name)
                .long(*name)
                .help(*help)
                .action(ArgAction::SetTrue)
        })
        .collect()
}

/// Run the given passes over `root` in order, handing the tree from one
/// pass to the next by value.
///
/// Each pass receives the previous pass's output and produces a new root;
/// an unknown pass name surfaces as the dispatch implementation's error.
pub fn run_passes<T: PassDispatch>(root: Node, passes: &Passes) -> Result<Node, IrError> {
    let mut current = root;
    for pass in passes.vec() {
        debug!("running pass {pass}");
        current = T::dispatch(&current, pass)?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_names_strip_flag_prefix() {
        let passes = Passes::from_vec(vec!["--fold-constants", "check-dialect"]);
        let names: Vec<&str> = passes.vec().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["fold-constants", "check-dialect"]);
        assert_eq!(passes.to_string(), "fold-constants check-dialect");
    }
}

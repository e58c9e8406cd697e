//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use atelier_models::Role;

/// Atelier - workshop and workbench reconciliation
#[derive(Parser, Debug)]
#[command(name = "atelier")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to state directory
    #[arg(short, long, env = "ATELIER_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Root directory bench paths are derived under
    #[arg(short, long, env = "ATELIER_BENCHES_ROOT")]
    pub benches_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show what reconciling a workshop would do, without applying anything
    Plan {
        /// Workshop name or ID
        #[arg(required = true)]
        workshop: String,
    },

    /// Materialize workshop infrastructure (directories, worktrees, markers)
    Apply {
        /// Workshop name or ID
        #[arg(required = true)]
        workshop: String,

        /// Isolate failures per bench instead of stopping at the first
        #[arg(long)]
        best_effort: bool,
    },

    /// Open a workshop session with one window per bench
    Open {
        /// Workshop name or ID
        #[arg(required = true)]
        workshop: String,
    },

    /// Manage workshops
    #[command(subcommand)]
    Workshop(WorkshopCommands),

    /// Manage workbenches
    #[command(subcommand)]
    Bench(BenchCommands),

    /// Manage commissions
    #[command(subcommand)]
    Commission(CommissionCommands),

    /// Manage workplans within a commission
    #[command(subcommand)]
    Workplan(WorkplanCommands),
}

#[derive(Subcommand, Debug)]
pub enum WorkshopCommands {
    /// Create a new workshop
    New {
        /// Workshop name
        #[arg(required = true)]
        name: String,
    },

    /// List all workshops
    List {
        /// Output format (table, json, brief)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Subcommand, Debug)]
pub enum BenchCommands {
    /// Add a workbench to a workshop
    Add {
        /// Workshop name or ID
        #[arg(required = true)]
        workshop: String,

        /// Bench name
        #[arg(required = true)]
        name: String,

        /// Branch the bench works on
        #[arg(short, long, default_value = "main")]
        branch: String,

        /// Role of the actor at this bench
        #[arg(short, long, value_enum, default_value = "implementer")]
        role: RoleArg,

        /// Source repository to add a worktree from
        #[arg(long)]
        repo: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CommissionCommands {
    /// Create a new commission in a workshop
    New {
        /// Workshop name or ID
        #[arg(required = true)]
        workshop: String,

        /// Commission title
        #[arg(required = true)]
        title: String,

        /// Role the invoking actor acts as
        #[arg(long, value_enum, env = "ATELIER_ROLE", default_value = "orchestrator")]
        acting_as: RoleArg,
    },

    /// List commissions, optionally scoped to one workshop
    List {
        /// Workshop name or ID
        #[arg(short, long)]
        workshop: Option<String>,
    },

    /// Pin a commission so it cannot be closed
    Pin {
        /// Commission ID
        #[arg(required = true)]
        id: String,
    },

    /// Unpin a commission
    Unpin {
        /// Commission ID
        #[arg(required = true)]
        id: String,
    },

    /// Take exclusive focus on a commission from one bench
    Focus {
        /// Commission ID
        #[arg(required = true)]
        id: String,

        /// Workshop name or ID
        #[arg(short, long, required = true)]
        workshop: String,

        /// Bench whose actor takes focus
        #[arg(short, long, required = true)]
        bench: String,
    },

    /// Release a bench's focus
    Release {
        /// Workshop name or ID
        #[arg(short, long, required = true)]
        workshop: String,

        /// Bench whose actor releases focus
        #[arg(short, long, required = true)]
        bench: String,
    },

    /// Mark a commission complete
    Complete {
        /// Commission ID
        #[arg(required = true)]
        id: String,
    },

    /// Delete a commission
    Delete {
        /// Commission ID
        #[arg(required = true)]
        id: String,

        /// Delete even when workplans exist
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum WorkplanCommands {
    /// Add a draft workplan to a commission
    Add {
        /// Commission ID
        #[arg(required = true)]
        commission: String,

        /// One-line summary of the approach
        #[arg(required = true)]
        summary: String,
    },

    /// Advance a workplan to its next status
    Advance {
        /// Commission ID
        #[arg(required = true)]
        commission: String,

        /// Workplan ID
        #[arg(required = true)]
        workplan: String,
    },
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Brief,
}

/// Actor role as a CLI argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum RoleArg {
    Orchestrator,
    Implementer,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Orchestrator => Role::Orchestrator,
            RoleArg::Implementer => Role::Implementer,
        }
    }
}

impl Cli {
    /// Returns the state directory path, using default if not specified.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".atelier"))
                .unwrap_or_else(|| PathBuf::from(".atelier"))
        })
    }

    /// Returns the root directory bench paths are derived under.
    pub fn benches_root(&self) -> PathBuf {
        self.benches_root.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join("atelier"))
                .unwrap_or_else(|| PathBuf::from("atelier"))
        })
    }

    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

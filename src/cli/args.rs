//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Content lifecycle management shell: build and promote staged software channel projects
#[derive(Parser, Debug)]
#[command(name = "clmsh")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: ~/.config/clmsh/clmsh.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Server host name or origin URL
    #[arg(short, long, global = true)]
    pub server: Option<String>,

    /// Login name
    #[arg(short, long, global = true)]
    pub username: Option<String>,

    /// Password (prompted for when not configured)
    #[arg(short, long, global = true)]
    pub password: Option<String>,

    /// Use plain HTTP
    #[arg(long, global = true)]
    pub nossl: bool,

    /// Terse output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Clm(ClmCommand),

    /// Interactive shell with history and tab completion
    Shell,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Content lifecycle commands, available one-shot and inside `clmsh shell`.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ClmCommand {
    /// Shows a list of clm projects
    #[command(name = "clm_projectlist")]
    ProjectList,

    /// Shows a list of environments configured in given project
    #[command(name = "clm_projectlistenv")]
    ProjectListEnv { project: String },

    /// Shows the sources used by given project
    #[command(name = "clm_projectlistsrc")]
    ProjectListSrc { project: String },

    /// Shows filters used by given project
    #[command(name = "clm_projectlistfilter")]
    ProjectListFilter { project: String },

    /// Shows filter criteria per entity type
    #[command(name = "clm_filterlistcriterias")]
    FilterListCriterias,

    /// Details overview of a project
    #[command(name = "clm_projectdetails")]
    ProjectDetails { project: String },

    /// Builds given project
    #[command(name = "clm_projectbuild")]
    ProjectBuild { project: String },

    /// Promotes a stage
    #[command(name = "clm_projectpromote")]
    ProjectPromote { project: String, environment: String },

    /// Create a new project
    #[command(name = "clm_projectcreate")]
    ProjectCreate {
        label: String,
        name: String,
        description: Option<String>,
    },

    /// Attaching software channel(s) to a given project
    #[command(name = "clm_projectattachesource")]
    ProjectAttacheSource {
        project: String,
        /// Channel label, or a comma separated list of labels
        source: String,
        #[arg(default_value = crate::domain::DEFAULT_SOURCE_TYPE)]
        source_type: String,
    },

    /// Detach software channel(s) from a project
    #[command(name = "clm_projectdetachesource")]
    ProjectDetacheSource {
        project: String,
        /// Channel label, or a comma separated list of labels
        source: String,
        #[arg(default_value = crate::domain::DEFAULT_SOURCE_TYPE)]
        source_type: String,
    },

    /// Create a new environment at the end of a project's pipeline
    #[command(name = "clm_projectaddenv")]
    ProjectAddEnv {
        project: String,
        label: String,
        name: String,
        description: String,
    },

    /// Remove an environment from a project
    #[command(name = "clm_projectdelenv")]
    ProjectDelEnv { project: String, environment: String },

    /// Move all stages further: build, then promote every stage
    #[command(name = "clm_projectstagingfull")]
    ProjectStagingFull {
        /// Promote from the last stage backwards and build last
        #[arg(short, long)]
        reverse: bool,
        project: String,
    },

    /// Shows a list of configured filters
    #[command(name = "clm_filterlist")]
    FilterList,

    /// Create a new filter
    #[command(name = "clm_filtercreate")]
    FilterCreate {
        name: String,
        /// allow or deny
        rule: String,
        /// Entity type, e.g. package, erratum, module
        entity_type: String,
        field: String,
        matcher: String,
        value: String,
    },

    /// Attach a filter to a project
    #[command(name = "clm_projectattachefilter")]
    ProjectAttacheFilter { project: String, filter: String },

    /// Detach a filter from a project
    #[command(name = "clm_projectdetachefilter")]
    ProjectDetacheFilter { project: String, filter: String },

    /// Create AppStream filters for a modular channel
    #[command(name = "clm_filtercreateappstream")]
    FilterCreateAppstream {
        project: String,
        channel: String,
        prefix: String,
    },

    /// Shows build state of a project
    #[command(name = "clm_projectstatus")]
    ProjectStatus { project: String },

    /// Shows package differences between two project environments
    #[command(name = "clm_envdiff")]
    EnvDiff {
        project: String,
        env1: String,
        env2: String,
    },
}

/// One line typed into the interactive shell.
#[derive(Parser, Debug)]
#[command(name = "clmsh", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ClmCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config (password masked)
    Show,

    /// Create config template
    Init,

    /// Show config path
    Path,
}

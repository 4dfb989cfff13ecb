use bpaf::Bpaf;
use doctree::{Direction, outline};
use mimalloc::MiMalloc;
use project::{EditTarget, Project, ProjectConfig, ProjectError};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Inspect and edit Skipole page and section files.
#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
struct Cli {
    /// Project the file belongs to
    #[bpaf(long, argument("NAME"), fallback("project".to_string()))]
    project: String,
    /// TOML file with project settings
    #[bpaf(long, argument("FILE"))]
    config: Option<PathBuf>,
    /// Write the edited file here instead of overwriting the input
    #[bpaf(short, long, argument("FILE"))]
    output: Option<PathBuf>,
    #[bpaf(external(command))]
    command: Command,
}

#[derive(Debug, Clone, Bpaf)]
enum Command {
    /// Print the tree with the location of every item
    #[bpaf(command("outline"))]
    Outline {
        #[bpaf(positional("FILE"))]
        file: PathBuf,
    },
    /// Describe the item at a location
    #[bpaf(command("info"))]
    Info {
        #[bpaf(positional("FILE"))]
        file: PathBuf,
        #[bpaf(positional("LOCATION"))]
        location: String,
    },
    /// Delete the item at a location
    #[bpaf(command("delete"))]
    Delete {
        #[bpaf(positional("FILE"))]
        file: PathBuf,
        #[bpaf(positional("LOCATION"))]
        location: String,
    },
    /// Move an item to another location in the same tree
    #[bpaf(command("move"))]
    Move {
        #[bpaf(positional("FILE"))]
        file: PathBuf,
        #[bpaf(positional("FROM"))]
        from: String,
        #[bpaf(positional("TO"))]
        to: String,
    },
    /// Move an item one step: up, down, up-right or down-right
    #[bpaf(command("step"))]
    Step {
        #[bpaf(positional("FILE"))]
        file: PathBuf,
        #[bpaf(positional("LOCATION"))]
        location: String,
        #[bpaf(positional("DIRECTION"))]
        direction: Direction,
    },
}

impl Command {
    fn file(&self) -> &PathBuf {
        match self {
            Command::Outline { file }
            | Command::Info { file, .. }
            | Command::Delete { file, .. }
            | Command::Move { file, .. }
            | Command::Step { file, .. } => file,
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ProjectConfig, ProjectError> {
    match path {
        Some(path) => ProjectConfig::from_toml_str(&fs::read_to_string(path)?),
        None => Ok(ProjectConfig::default()),
    }
}

fn run(cli: Cli) -> Result<(), ProjectError> {
    let mut project = Project::new(cli.project.as_str(), load_config(cli.config.as_ref())?)?;
    let input = cli.command.file().clone();
    let target = project.upload_document(&fs::read(&input)?)?;
    let token = project.token(&target)?.clone();
    log::debug!(target: "skipole_edit", "loaded {target} from {}", input.display());

    match cli.command {
        Command::Outline { .. } => {
            for row in outline(project.document(&target)?) {
                let location = row.location.to_string();
                println!("{location:<24}{}{}", "  ".repeat(row.depth), row.label);
            }
            return Ok(());
        }
        Command::Info { location, .. } => {
            let info = project.part_info(&target, &location)?;
            println!("location: {}", info.location);
            match info.kind {
                Some(kind) => println!("kind:     {}", kind.tag()),
                None => println!("kind:     container"),
            }
            if let Some(widget) = &info.widget_name {
                println!("widget:   {widget}");
            }
            println!("brief:    {}", info.brief);
            return Ok(());
        }
        Command::Delete { location, .. } => {
            project.delete_node(&target, &token, &location)?;
            println!("deleted {location}");
        }
        Command::Move { from, to, .. } => {
            let (landed, _) = project.move_node(&target, &token, &from, &to)?;
            println!("moved {from} to {landed}");
        }
        Command::Step {
            location,
            direction,
            ..
        } => {
            let (landed, _) = project.move_item(&target, &token, &location, direction)?;
            println!("moved {location} to {landed}");
        }
    }

    let out = cli.output.unwrap_or(input);
    fs::write(&out, project.dump_document(&target)?)?;
    log::info!(target: "skipole_edit", "wrote {}", out.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match run(cli().run()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!(target: "skipole_edit", "{err:?}");
            eprintln!("{}", err.user_message());
            ExitCode::FAILURE
        }
    }
}

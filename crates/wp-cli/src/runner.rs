//! Command dispatch, separated from process setup so it can be tested.

use crate::{
    CliError, CliResult, cli::Cli, logger, var_commands::VarCommands,
    wallpaper_commands::WallpaperCommands,
};

use std::path::{Path, PathBuf};

use log::info;
use wp_config::{
    CommandSpec, Config, ConfigError, ConfigErrorResult, ConfigStore, FileStore,
    KEY_COMMAND, KEY_PORT, KEY_SINGLE_INSTANCE, KEY_START_NOW, WallpaperDefaults, parse_bool,
};
use wp_control::{ControlClient, Supervisor};

/// Loaded configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    config_dir: PathBuf,
    config: Config,
}

impl Context {
    /// Load and validate `config.toml` from `config_dir`, or from the
    /// default config directory.
    pub fn load(config_dir: Option<PathBuf>) -> CliResult<Self> {
        let config_dir = match config_dir {
            Some(dir) => dir,
            None => Config::config_dir()?,
        };

        let config = Config::load_from(&config_dir)?;
        config.validate()?;

        Ok(Self { config_dir, config })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Variables of one feature inside `vars.toml`.
    pub fn store(&self, defaults: &WallpaperDefaults) -> FileStore {
        FileStore::new(Config::vars_path(&self.config_dir), defaults.name)
    }
}

/// Full invocation: config, logging, then the command.
/// Returns the text to print on stdout, if any.
pub async fn run(cli: Cli) -> CliResult<Option<String>> {
    let ctx = Context::load(cli.config_dir)?;

    let logging = &ctx.config.logging;
    logger::initialize(
        logging.level,
        ctx.config.log_file_path(&ctx.config_dir),
        logging.colored,
    )?;

    let (defaults, action) = cli.command.into_parts();
    execute(&ctx, &defaults, action).await
}

pub(crate) async fn execute(
    ctx: &Context,
    defaults: &WallpaperDefaults,
    action: WallpaperCommands,
) -> CliResult<Option<String>> {
    let defaults = ctx.config.wallpaper_defaults(defaults)?;
    let store = ctx.store(&defaults);
    let control = &ctx.config.control;

    match action {
        WallpaperCommands::Init => {
            for (key, value) in defaults.default_values() {
                store.set(key, &value)?;
            }
            info!("Reset {} variables to defaults", defaults.name);
            Ok(None)
        }
        WallpaperCommands::RunServer => {
            ctx.config.log_summary();
            Supervisor::new(store, defaults, control.clone())
                .run()
                .await?;
            Ok(None)
        }
        WallpaperCommands::Start => {
            ControlClient::from_store(&store, control)?.start().await?;
            Ok(None)
        }
        WallpaperCommands::Stop => {
            ControlClient::from_store(&store, control)?.stop().await?;
            Ok(None)
        }
        WallpaperCommands::Status => {
            let state = ControlClient::from_store(&store, control)?.status().await?;
            Ok(Some(state.to_string()))
        }
        WallpaperCommands::Var { action } => var(&store, action),
        WallpaperCommands::SetCommand { value } => var(&store, set_action(KEY_COMMAND, value)),
        WallpaperCommands::SetStartNow { value } => var(&store, set_action(KEY_START_NOW, value)),
        WallpaperCommands::SetSingleInstance { value } => {
            var(&store, set_action(KEY_SINGLE_INSTANCE, value))
        }
    }
}

fn set_action(key: &str, value: String) -> VarCommands {
    VarCommands::Set {
        key: key.to_string(),
        value,
    }
}

fn var<S: ConfigStore>(store: &S, action: VarCommands) -> CliResult<Option<String>> {
    match action {
        VarCommands::List => {
            let lines: Vec<String> = store
                .entries()?
                .into_iter()
                .map(|(key, value)| format!("{key} = {value}"))
                .collect();
            Ok((!lines.is_empty()).then(|| lines.join("\n")))
        }
        VarCommands::Get { key } => match store.get(&key)? {
            Some(value) => Ok(Some(value)),
            None => Err(CliError::from(ConfigError::missing(key))),
        },
        VarCommands::Set { key, value } => {
            validate_var(&key, &value)?;
            store.set(&key, &value)?;
            Ok(None)
        }
    }
}

/// Reject values the supervisor would refuse to load.
fn validate_var(key: &str, value: &str) -> ConfigErrorResult<()> {
    match key {
        KEY_COMMAND => CommandSpec::from_json(key, value).map(|_| ()),
        KEY_START_NOW | KEY_SINGLE_INSTANCE => parse_bool(key, value).map(|_| ()),
        KEY_PORT => match value.trim().parse::<u16>() {
            Ok(port) if port > 0 => Ok(()),
            _ => Err(ConfigError::invalid(
                key,
                format!("'{value}' is not a port number"),
            )),
        },
        _ => Ok(()),
    }
}

use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use std::{
    env,
    ffi::OsString,
    fmt,
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
    str::FromStr,
    time::Duration,
};
use tracing::Level;
use wthroo_core::{
    Config, Forecast, OpenWeatherSource, OutputFormat, Units, WeatherError, WeatherQuery,
    WeatherSource,
    provider::openweather::DEFAULT_API_URL,
};

const DEFAULT_LOG_LEVEL: Level = Level::WARN;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "wthroo",
    version,
    about = "A command line OpenWeatherMap lookup tool.",
    long_about = "A simple command line OpenWeatherMap lookup tool."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub lookup: LookupArgs,

    /// Path to the config file. Defaults to the platform config directory.
    #[arg(long, env = "WTHROO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info', 'warn', and 'error'
    /// (case insensitive)
    #[arg(long, default_value_t = DEFAULT_LOG_LEVEL, global = true)]
    pub log_level: Level,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively store an API key and default lookup settings.
    Configure,
}

/// A flag value where an empty string, such as `UNITS=` in the environment,
/// counts as not given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaybeBlank<T>(pub Option<T>);

impl<T: FromStr> FromStr for MaybeBlank<T> {
    type Err = T::Err;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.is_empty() {
            Ok(Self(None))
        } else {
            value.parse().map(|v| Self(Some(v)))
        }
    }
}

impl<T> From<T> for MaybeBlank<T> {
    fn from(value: T) -> Self {
        Self(Some(value))
    }
}

fn given<T>(value: Option<MaybeBlank<T>>) -> Option<T> {
    value.and_then(|v| v.0)
}

/// Flags for a single weather lookup.
#[derive(Debug, Clone, Default, Args)]
pub struct LookupArgs {
    /// API key from OpenWeatherMap.
    #[arg(short = 'k', long = "apiKey", env = "APIKEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// City to get weather info from. Can be city name, state code and country code divided by comma.
    #[arg(short, long, env = "CITY")]
    pub city: Option<String>,

    /// Units of measurement: standard, metric or imperial. Defaults to metric.
    #[arg(short, long, env = "UNITS")]
    pub units: Option<MaybeBlank<Units>>,

    /// Type of forecast, default is current values. Options: hourly, daily, climate.
    #[arg(short, long, env = "FORECAST")]
    pub forecast: Option<Forecast>,

    /// Data format. Possible values are json and xml. Defaults to json.
    #[arg(short, long, env = "OUTPUT")]
    pub output: Option<MaybeBlank<OutputFormat>>,

    /// Timeout for the weather request, in milliseconds. No timeout by default.
    #[arg(long, env = "TIMEOUT_MILLIS")]
    pub timeout_millis: Option<MaybeBlank<u64>>,

    /// Base URL for the OpenWeatherMap API [default: https://api.openweathermap.org/data/2.5/]
    #[arg(long, env = "WTHROO_API_URL")]
    pub api_url: Option<String>,
}

/// A required value that was found neither in flags, environment nor config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingArg {
    City,
    ApiKey,
}

impl fmt::Display for MissingArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingArg::City => f.write_str("a city is required (--city or CITY)"),
            MissingArg::ApiKey => f.write_str("an API key is required (--apiKey or APIKEY)"),
        }
    }
}

/// Fully resolved lookup settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub query: WeatherQuery,
    pub api_url: String,
    pub timeout: Option<Duration>,
    /// Print the resolved location and stop before any client is built.
    pub debug: bool,
}

impl LookupArgs {
    /// Merge flags (and their environment variables) over the config file.
    pub fn resolve(&self, config: &Config, debug: bool) -> Result<Settings, MissingArg> {
        let city = non_empty(self.city.as_deref()).or(config.city()).ok_or(MissingArg::City)?;
        let api_key =
            non_empty(self.api_key.as_deref()).or(config.api_key()).ok_or(MissingArg::ApiKey)?;
        let units = given(self.units).or(config.units).unwrap_or_default();

        let query = WeatherQuery::new(city, units, api_key)
            .with_forecast(self.forecast.unwrap_or_default())
            .with_output(given(self.output).unwrap_or_default());

        Ok(Settings {
            query,
            api_url: non_empty(self.api_url.as_deref()).unwrap_or(DEFAULT_API_URL).to_string(),
            timeout: given(self.timeout_millis).map(Duration::from_millis).or(config.timeout()),
            debug,
        })
    }

    /// Resolve settings, then either print the location (debug mode) or
    /// build a source with `connect` and print the weather.
    pub async fn execute<S, F, W>(
        &self,
        config: &Config,
        debug: bool,
        connect: F,
        out: &mut W,
    ) -> anyhow::Result<ExitCode>
    where
        S: WeatherSource,
        F: FnOnce(&Settings) -> Result<S, WeatherError>,
        W: Write,
    {
        let settings = match self.resolve(config, debug) {
            Ok(settings) => settings,
            Err(missing) => {
                eprintln!("Error: {missing}\n\n{}", Cli::command().render_usage());
                return Ok(ExitCode::FAILURE);
            }
        };

        if settings.debug {
            writeln!(out, "City:  {}", settings.query.location)?;
            return Ok(ExitCode::SUCCESS);
        }

        let source = connect(&settings)?;
        print_weather(&settings, &source, out).await?;
        Ok(ExitCode::SUCCESS)
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Some(Command::Configure) => {
                configure(self.config.as_deref())?;
                Ok(ExitCode::SUCCESS)
            }
            None => {
                let config = match &self.config {
                    Some(path) => Config::load_from(path)?,
                    None => Config::load()?,
                };

                let debug = debug_enabled(env::var_os("DEBUG"));
                self.lookup
                    .execute(&config, debug, connect, &mut io::stdout())
                    .await
            }
        }
    }
}

fn connect(settings: &Settings) -> Result<OpenWeatherSource, WeatherError> {
    OpenWeatherSource::new(&settings.api_url, settings.timeout)
}

/// Look up the weather and write it to `out`.
pub async fn print_weather<W: Write>(
    settings: &Settings,
    source: &dyn WeatherSource,
    out: &mut W,
) -> anyhow::Result<()> {
    tracing::debug!(message = "looking up weather", query = ?settings.query);
    let body = wthroo_core::lookup(source, &settings.query)
        .await
        .with_context(|| format!("Weather lookup for '{}' failed", settings.query.location))?;

    out.write_all(&body)?;
    writeln!(out)?;
    Ok(())
}

/// Exit code for a failed argument parse. `--help` and `--version` are
/// reported through the same error type but are not failures.
pub fn parse_failure_code(err: &clap::Error) -> ExitCode {
    if err.exit_code() == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// `DEBUG` set to any non-empty value enables debug mode.
pub fn debug_enabled(value: Option<OsString>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn configure(path: Option<&Path>) -> anyhow::Result<()> {
    let loaded = match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        tracing::warn!(message = "ignoring unreadable config file", error = %e);
        Config::default()
    });

    let key_prompt = if config.api_key().is_some() {
        "OpenWeatherMap API key (leave empty to keep the current one):"
    } else {
        "OpenWeatherMap API key:"
    };
    let api_key = Password::new(key_prompt)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;

    let mut city_prompt = Text::new("Default city (optional):");
    if let Some(city) = config.city() {
        city_prompt = city_prompt.with_default(city);
    }
    let city = city_prompt.prompt()?;

    let current = config.units.unwrap_or_default();
    let cursor = Units::all().iter().position(|u| *u == current).unwrap_or_default();
    let units = Select::new("Default units:", Units::all().to_vec())
        .with_starting_cursor(cursor)
        .prompt()?;

    apply_answers(&mut config, api_key, city, units);

    let saved = match path {
        Some(path) => {
            config.save_to(path)?;
            path.to_path_buf()
        }
        None => config.save()?,
    };
    println!("Saved configuration to {}", saved.display());

    Ok(())
}

/// Fold prompt answers into `config`. An empty API key keeps the stored one.
fn apply_answers(config: &mut Config, api_key: String, city: String, units: Units) {
    let api_key = api_key.trim().to_string();
    if !api_key.is_empty() {
        config.api_key = Some(api_key);
    }

    let city = city.trim().to_string();
    config.city = if city.is_empty() { None } else { Some(city) };
    config.units = Some(units);
}

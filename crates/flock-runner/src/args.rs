use std::str::FromStr;

/// Command-line options, all in `--key=value` form.
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerArgs {
    pub generations: u32,
    pub population: usize,
    pub hidden: usize,
    pub seed: Option<u64>,
    pub config: Option<String>,
    pub max_ticks: Option<u64>,
    pub json: bool,
}

impl Default for RunnerArgs {
    fn default() -> Self {
        Self {
            generations: 50,
            population: 50,
            hidden: 6,
            seed: None,
            config: None,
            max_ticks: None,
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgsError {
    UnknownFlag(String),
    InvalidValue { flag: &'static str, value: String },
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownFlag(flag) => write!(f, "unknown argument: {flag}"),
            Self::InvalidValue { flag, value } => write!(f, "invalid value for --{flag}: {value}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn parse_value<T: FromStr>(flag: &'static str, raw: &str) -> Result<T, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidValue {
        flag,
        value: raw.to_string(),
    })
}

impl RunnerArgs {
    /// Parse arguments, excluding the program name.
    pub fn parse<I>(args: I) -> Result<Self, ArgsError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Self::default();
        for arg in args {
            if arg == "--json" {
                parsed.json = true;
            } else if let Some(v) = arg.strip_prefix("--generations=") {
                parsed.generations = parse_value("generations", v)?;
            } else if let Some(v) = arg.strip_prefix("--population=") {
                parsed.population = parse_value("population", v)?;
            } else if let Some(v) = arg.strip_prefix("--hidden=") {
                parsed.hidden = parse_value("hidden", v)?;
                if parsed.hidden == 0 {
                    return Err(ArgsError::InvalidValue {
                        flag: "hidden",
                        value: v.to_string(),
                    });
                }
            } else if let Some(v) = arg.strip_prefix("--seed=") {
                parsed.seed = Some(parse_value("seed", v)?);
            } else if let Some(v) = arg.strip_prefix("--max-ticks=") {
                parsed.max_ticks = Some(parse_value("max-ticks", v)?);
            } else if let Some(v) = arg.strip_prefix("--config=") {
                parsed.config = Some(v.to_string());
            } else {
                return Err(ArgsError::UnknownFlag(arg));
            }
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<RunnerArgs, ArgsError> {
        RunnerArgs::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_args_gives_defaults() {
        assert_eq!(parse(&[]).unwrap(), RunnerArgs::default());
    }

    #[test]
    fn all_flags() {
        let args = parse(&[
            "--generations=3",
            "--population=12",
            "--hidden=4",
            "--seed=99",
            "--max-ticks=1000",
            "--config=custom.toml",
            "--json",
        ])
        .unwrap();
        assert_eq!(args.generations, 3);
        assert_eq!(args.population, 12);
        assert_eq!(args.hidden, 4);
        assert_eq!(args.seed, Some(99));
        assert_eq!(args.max_ticks, Some(1000));
        assert_eq!(args.config.as_deref(), Some("custom.toml"));
        assert!(args.json);
    }

    #[test]
    fn bad_number_names_the_flag() {
        assert_eq!(
            parse(&["--population=lots"]),
            Err(ArgsError::InvalidValue {
                flag: "population",
                value: "lots".into()
            })
        );
    }

    #[test]
    fn zero_hidden_rejected() {
        assert!(matches!(
            parse(&["--hidden=0"]),
            Err(ArgsError::InvalidValue { flag: "hidden", .. })
        ));
    }

    #[test]
    fn unknown_flag_rejected() {
        assert_eq!(
            parse(&["--speciate"]),
            Err(ArgsError::UnknownFlag("--speciate".into()))
        );
    }
}

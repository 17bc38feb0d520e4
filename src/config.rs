use std::path::PathBuf;

const DEFAULT_MATCHES_CSV: &str = "data/pkl_matches_cleaned.csv";
const DEFAULT_ROSTERS_CSV: &str = "data/pkl_rosters_cleaned.csv";
const DEFAULT_LOG_FILE: &str = "pkl_terminal.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub matches_path: PathBuf,
    pub rosters_path: PathBuf,
    pub export_path: Option<PathBuf>,
    pub log_file: PathBuf,
}

impl DashboardConfig {
    /// Reads `.env.local` / `.env`, then the process environment and arguments.
    pub fn from_env_and_args() -> Self {
        load_dotenv();
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        Self::resolve(&args, |key| std::env::var(key).ok())
    }

    /// CLI arguments win over environment values, which win over defaults.
    pub fn resolve(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let setting = |flag: &str, key: &str| {
            arg_value(args, flag).or_else(|| env(key).filter(|val| !val.trim().is_empty()))
        };
        Self {
            matches_path: setting("--matches", "PKL_MATCHES_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MATCHES_CSV)),
            rosters_path: setting("--rosters", "PKL_ROSTERS_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ROSTERS_CSV)),
            export_path: setting("--export", "PKL_EXPORT_PATH").map(PathBuf::from),
            log_file: setting("--log-file", "PKL_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }

    /// Configured export path, or a timestamped workbook in the working directory.
    pub fn export_path_or_default(&self) -> PathBuf {
        self.export_path.clone().unwrap_or_else(|| {
            let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            PathBuf::from(format!("pkl_summary_{stamp}.xlsx"))
        })
    }
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

/// Value of `--name=value` or `--name value`.
pub fn arg_value(args: &[String], name: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(rest) = arg.strip_prefix(name) {
            if let Some(value) = rest.strip_prefix('=') {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
                continue;
            }
            if !rest.is_empty() {
                continue;
            }
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() && !next.starts_with("--") {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| arg == name)
}

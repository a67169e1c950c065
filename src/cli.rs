//! Helpers shared by the command-line entry points.

use tracing_subscriber::EnvFilter;

/// Loads `.env.local` / `.env` and installs the log subscriber (`RUST_LOG`,
/// default `info`).
pub fn init_env_and_logging() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Value of `--name=value` or `--name value`; blank values are ignored.
pub fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn arg_value_supports_both_forms() {
        let a = args(&["--league", "Premier League", "--out=data/pl.csv"]);
        assert_eq!(arg_value(&a, "--league").as_deref(), Some("Premier League"));
        assert_eq!(arg_value(&a, "--out").as_deref(), Some("data/pl.csv"));
        assert_eq!(arg_value(&a, "--date"), None);
    }

    #[test]
    fn blank_values_are_ignored() {
        let a = args(&["--out=", "--league", " "]);
        assert_eq!(arg_value(&a, "--out"), None);
        assert_eq!(arg_value(&a, "--league"), None);
    }

    #[test]
    fn flags_are_exact() {
        let a = args(&["--json"]);
        assert!(has_flag(&a, "--json"));
        assert!(!has_flag(&a, "--keep-partial"));
    }
}

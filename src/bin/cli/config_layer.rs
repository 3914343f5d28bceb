//! Configuration Layer Management
//!
//! Builds the effective configuration from three layers, later layers
//! winning: built-in defaults, a YAML file (`--config` or an implicit
//! `.literalist.yml` / `.literalist.yaml` in the working directory), and
//! command-line flags.

use anyhow::Context;
use std::path::PathBuf;

use crate::cli::args::ScanArgs;
use literalist::ExtractionConfig;

/// Names probed when no `--config` is given.
const IMPLICIT_CONFIG_FILES: &[&str] = &[".literalist.yml", ".literalist.yaml"];

/// Merge CLI overrides into a configuration
pub trait ApplyCliArgs {
    /// Apply every flag that was given, leaving the rest untouched
    fn apply_cli_args(&mut self, args: &ScanArgs) -> anyhow::Result<()>;
}

impl ApplyCliArgs for ExtractionConfig {
    fn apply_cli_args(&mut self, args: &ScanArgs) -> anyhow::Result<()> {
        if let Some(path) = &args.path {
            self.root = path.clone();
        }
        if let Some(constants_file) = &args.constants_file {
            self.constants_file = constants_file.clone();
        }
        if let Some(min_length) = args.min_length {
            self.min_length = min_length;
        }
        if let Some(min_count) = args.min_count {
            self.min_count = min_count;
        }
        if args.no_local_scope {
            self.use_local_scope = false;
        }
        if let Some(report_file) = &args.report_file {
            self.report_file = report_file.clone();
        }

        self.ignored_calls.extend(args.ignore_calls.iter().cloned());
        self.excluded_dirs.extend(args.excludes.iter().cloned());
        self.ignored_strings.extend(args.ignore_strs.iter().cloned());
        self.ignored_numbers
            .apply_tokens(&args.ignore_nums, &args.include_nums)
            .context("Invalid --ignore-num/--include-num value")?;

        if args.no_numbers || args.no_ints {
            self.scan_ints = false;
        }
        if args.no_numbers || args.no_floats {
            self.scan_floats = false;
        }
        if args.no_bytes {
            self.scan_bytes = false;
        }
        if let Some(naming) = args.naming {
            self.naming = naming.into();
        }
        self.extra_constants
            .extend(args.extra_constants.iter().cloned());
        Ok(())
    }
}

/// Configuration file to load, if any.
fn config_file(args: &ScanArgs) -> Option<PathBuf> {
    args.config.clone().or_else(|| {
        IMPLICIT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    })
}

/// Enhanced configuration loading with layered approach
pub fn build_layered_config(args: &ScanArgs) -> anyhow::Result<ExtractionConfig> {
    let mut config = match config_file(args) {
        Some(path) => ExtractionConfig::from_yaml_file(&path).with_context(|| {
            format!("Failed to load configuration from {}", path.display())
        })?,
        None => ExtractionConfig::default(),
    };

    config.apply_cli_args(args)?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::NamingArg;
    use literalist::NamingStrategy;

    #[test]
    fn test_cli_flags_override_defaults() {
        let args = ScanArgs {
            path: Some(PathBuf::from("src")),
            min_count: Some(3),
            no_local_scope: true,
            no_numbers: true,
            naming: Some(NamingArg::Generic),
            ignore_nums: vec!["42".to_string()],
            include_nums: vec!["0".to_string()],
            excludes: vec!["migrations".to_string()],
            ..ScanArgs::default()
        };
        let mut config = ExtractionConfig::default();
        config.apply_cli_args(&args).unwrap();

        assert_eq!(config.root, PathBuf::from("src"));
        assert_eq!(config.min_count, 3);
        assert!(!config.use_local_scope);
        assert!(!config.scan_ints && !config.scan_floats);
        assert!(config.scan_bytes);
        assert_eq!(config.naming, NamingStrategy::Generic);
        assert!(config.ignored_numbers.contains_int(42));
        assert!(!config.ignored_numbers.contains_int(0));
        assert!(config.excluded_dirs.contains("migrations"));
        assert!(config.excluded_dirs.contains(".git"));
    }

    #[test]
    fn test_bad_number_token_is_rejected() {
        let args = ScanArgs {
            ignore_nums: vec!["forty".to_string()],
            ..ScanArgs::default()
        };
        let mut config = ExtractionConfig::default();
        assert!(config.apply_cli_args(&args).is_err());
    }

    #[test]
    fn test_explicit_config_file_is_layered_under_flags() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("literalist.yml");
        std::fs::write(&path, "min_count: 5\nmin_length: 8\n").unwrap();
        let args = ScanArgs {
            config: Some(path),
            min_length: Some(6),
            ..ScanArgs::default()
        };
        let config = build_layered_config(&args).unwrap();
        assert_eq!(config.min_count, 5);
        assert_eq!(config.min_length, 6);
    }
}

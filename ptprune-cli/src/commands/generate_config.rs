//! Generate config command implementation

use anyhow::{Context, Result};
use clap::Args;
use ptprune_core::defaults;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        use std::fs;

        println!("Generating configuration template...");
        println!("  Output file: {}", self.output.display());

        let template = self.generate_template();

        fs::write(&self.output, template)
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("✓ Configuration template generated successfully!");
        println!();
        println!("Next steps:");
        println!("1. Edit the file to change the defaults");
        println!("2. Use it for pruning:");
        println!(
            "   ptprune prune --pr 10 --config {} table.txt",
            self.output.display()
        );

        Ok(())
    }

    /// Generate template configuration content
    fn generate_template(&self) -> String {
        format!(
            r#"# ptprune configuration
# Command line flags override every value below.

[decomposition]
# Log-probability of pairs that have no decomposition
floor = {floor:.1}

# Shorter-side length from which the ITG approximation replaces the exact
# search (0 = never)
itg_threshold = {itg}

# "recursive" queries the index per sub-rectangle, "batched" per source span
itg_variant = "recursive"

# 1-based probability column used as the pair's own probability
# (0 = first forward column)
column = 0

[performance]
# Worker threads (0 = all logical CPUs)
worker_threads = 0

# Minimum number of phrase pairs per work item
chunk_size = {chunk}

[output]
# Append the score to every emitted line
append_score = false

# Re-read the input file instead of keeping input lines in memory
low_memory = false
"#,
            floor = defaults::NONCOMPOSITIONAL_LOGPR,
            itg = defaults::ITG_THRESHOLD,
            chunk = defaults::CHUNK_SIZE,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;
    use tempfile::TempDir;

    #[test]
    fn test_template_matches_defaults() {
        let args = GenerateConfigArgs {
            output: PathBuf::from("ptprune.toml"),
        };

        let template = args.generate_template();
        assert!(template.contains("[decomposition]"));
        assert!(template.contains("[performance]"));
        assert!(template.contains("[output]"));
        assert_eq!(CliConfig::parse(&template).unwrap(), CliConfig::default());
    }

    #[test]
    fn test_execute_success() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("ptprune.toml");

        let args = GenerateConfigArgs {
            output: output_path.clone(),
        };

        assert!(args.execute().is_ok());
        assert!(CliConfig::load(&output_path).is_ok());
    }

    #[test]
    fn test_execute_unwritable_path() {
        let temp_dir = TempDir::new().unwrap();
        let args = GenerateConfigArgs {
            output: temp_dir.path().join("missing").join("ptprune.toml"),
        };

        let err = args.execute().unwrap_err();
        assert!(err.to_string().contains("Failed to write"));
    }
}

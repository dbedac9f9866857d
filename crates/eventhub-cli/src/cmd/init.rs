use anyhow::{Context as _, Result};
use clap::Args;
use eventhub_core::config::{self, ProjectConfig};
use eventhub_core::seed::seed_sample_events;
use serde::Serialize;
use std::path::Path;

use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite the config even if `.eventhub/` already exists. Events are kept.
    #[arg(long)]
    pub force: bool,

    /// Add the sample events after initializing.
    #[arg(long)]
    pub seed: bool,
}

const GITIGNORE: &str = "*.lock\n.*.tmp\n";

#[derive(Debug, Serialize)]
struct InitOutput {
    data_dir: String,
    config: String,
    seeded: usize,
}

/// Execute `eh init`. Creates the project skeleton:
///
/// ```text
/// .eventhub/
///   config.toml          (default project config)
///   eventhub_events.json (empty event list)
///   .gitignore           (lock and staging files)
/// ```
///
/// # Errors
///
/// Returns an error if `.eventhub/` already exists and `--force` is not set,
/// or if any filesystem operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let data_dir = config::data_dir(project_root);

    if data_dir.exists() && !args.force {
        anyhow::bail!(".eventhub/ already exists. Use `eh init --force` to reinitialize.");
    }

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;

    let project = ProjectConfig::default();
    let config_path = config::project_config_path(project_root);
    let config_text =
        toml::to_string_pretty(&project).context("Failed to serialize default config")?;
    std::fs::write(&config_path, config_text)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let gitignore = data_dir.join(".gitignore");
    std::fs::write(&gitignore, GITIGNORE)
        .with_context(|| format!("Failed to write {}", gitignore.display()))?;

    let store = project.open_store(project_root);
    if !store.backend().container_path(store.key()).exists() {
        store
            .replace_all(&[])
            .context("Failed to create the event container")?;
    }

    let seeded = if args.seed {
        seed_sample_events(&store, chrono::Utc::now()).context("Failed to seed sample events")?
    } else {
        0
    };

    tracing::info!(path = %data_dir.display(), seeded, "initialized eventhub project");

    let payload = InitOutput {
        data_dir: data_dir.display().to_string(),
        config: config_path.display().to_string(),
        seeded,
    };
    render(output, &payload, |p, w| {
        writeln!(w, "✓ Initialized eventhub in {}", p.data_dir)?;
        if p.seeded > 0 {
            writeln!(w, "  Added {} sample events.", p.seeded)?;
        }
        writeln!(w)?;
        writeln!(w, "Next steps:")?;
        writeln!(w, "  eh seed                     # add sample events")?;
        writeln!(w, "  eh list                     # browse upcoming events")?;
        writeln!(w, "  eh --as you@campus.edu register <ID>")
    })
}

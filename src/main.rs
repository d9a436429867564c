use anyhow::Context;
use churn_predictor::ChurnPredictor;
use churn_predictor::artifacts::demo_artifacts;
use churn_predictor::config::{self, Command, Config};
use clap::Parser;
use std::io;

fn main() -> anyhow::Result<()> {
    let cfg = Config::parse();
    config::init_logging();

    match cfg.command() {
        Command::ExportDemo => {
            std::fs::create_dir_all(&cfg.artifacts_dir).with_context(|| {
                format!("failed to create {}", cfg.artifacts_dir.display())
            })?;
            println!("💾 Saving demo artifacts to {:?}", cfg.artifacts_dir);
            demo_artifacts()?.save(&cfg.artifacts_dir)?;
            Ok(())
        }
        Command::Run => {
            let predictor = ChurnPredictor::load(&cfg.artifacts_dir).with_context(|| {
                format!(
                    "cannot start without artifacts in {}",
                    cfg.artifacts_dir.display()
                )
            })?;

            let stdin = io::stdin();
            let stdout = io::stdout();
            predictor
                .run_interactive(&mut stdin.lock(), &mut stdout.lock())
                .context("terminal I/O failed")
        }
    }
}

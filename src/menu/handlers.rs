use crate::component::PosterGenerator;
use crate::config::{Config, add_recent_path, save_settings};
use crate::pause;
use anyhow::Result;
use console::{Term, style};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn run_poster_generator(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let generator = PosterGenerator::new(config.clone(), Arc::clone(shutdown_signal));

    match generator.run() {
        Ok(input_path) => {
            add_recent_path(&mut config.settings, &input_path);
            save_settings(&config.settings)?;
        }
        Err(e) => eprintln!("{} {:#}", style("錯誤:").red().bold(), e),
    }

    pause(term)?;
    Ok(())
}

pub fn run_media_summary(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
) -> Result<()> {
    let generator = PosterGenerator::new(config.clone(), Arc::clone(shutdown_signal));

    if let Err(e) = generator.show_media_summary() {
        eprintln!("{} {:#}", style("錯誤:").red().bold(), e);
    }

    pause(term)?;
    Ok(())
}

use crate::component::poster_composer::GridType;
use crate::config::{Config, save_settings};
use crate::menu::handlers::{run_media_summary, run_poster_generator};
use anyhow::Result;
use console::{Term, style};
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style("=== 影片海報工具 ===").cyan().bold());
    println!("{}", style("按 ESC 離開").dim());

    let options = vec!["批次生成海報", "查看媒體摘要", "設定", "離開"];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇功能")
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_poster_generator(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(1) => {
            run_media_summary(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(2) => {
            show_grid_settings_menu(term, config)?;
            Ok(true)
        }
        Some(3) | None => Ok(false),
        _ => unreachable!(),
    }
}

/// 海報網格設定選單
fn show_grid_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style("=== 海報設定 ===").cyan().bold());
    println!("{}", style("按 ESC 返回").dim());

    println!(
        "\n{} {}",
        style("目前網格:").dim(),
        config.settings.poster.default_grid
    );
    println!();

    let grids = [GridType::Three, GridType::Four];
    let items: Vec<String> = vec!["3x3（9 格）".to_string(), "4x4（16 格）".to_string()];

    let default_index = grids
        .iter()
        .position(|&g| g == config.settings.poster.default_grid)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇海報網格")
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_grid = grids[selection];

    if selected_grid != config.settings.poster.default_grid {
        config.settings.poster.default_grid = selected_grid;
        save_settings(&config.settings)?;
        println!("\n{} {}", style("設定已儲存:").green(), selected_grid);
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}

use colored::Colorize;
use vogue_core::presets::STYLE_PRESETS;

pub fn run() {
    println!("{}", "快速風格".bright_magenta().bold());
    for (index, preset) in STYLE_PRESETS.iter().enumerate() {
        println!("  {} {}", format!("{}.", index + 1).bright_black(), preset);
    }
}

//! Interactive styling session on top of rustyline.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context as _, Result};
use colored::Colorize;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use vogue_application::{GenerateOutcome, SkipReason, StylingWorkflow};
use vogue_core::TryOnMode;
use vogue_core::config::AppConfig;
use vogue_core::presets::STYLE_PRESETS;
use vogue_infrastructure::{VoguePaths, read_image, write_image};

use super::bootstrap::{App, bootstrap};
use super::render;
use super::try_on::preset_index;

const COMMANDS: [&str; 12] = [
    "photo", "garment", "mode", "prompt", "preset", "generate", "save", "status", "reset",
    "help", "quit", "exit",
];

/// Commands whose argument is a file path.
const PATH_COMMANDS: [&str; 3] = ["photo", "garment", "save"];

#[derive(Debug, Clone, PartialEq)]
enum ShellCommand {
    Photo(PathBuf),
    Garment(PathBuf),
    Mode(TryOnMode),
    Prompt(String),
    Preset(usize),
    Generate,
    Save(Option<PathBuf>),
    Status,
    Reset,
    Help,
    Quit,
}

impl ShellCommand {
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim().trim_start_matches('/');
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let required = |usage: &str| {
            if rest.is_empty() {
                Err(format!("用法: {usage}"))
            } else {
                Ok(rest)
            }
        };

        match name.to_ascii_lowercase().as_str() {
            "photo" => Ok(Self::Photo(required("photo <路徑>")?.into())),
            "garment" => Ok(Self::Garment(required("garment <路徑>")?.into())),
            "mode" => {
                let value = required("mode <text|item>")?;
                TryOnMode::from_str(value)
                    .map(Self::Mode)
                    .map_err(|_| format!("未知的模式: {value} (text 或 item)"))
            }
            "prompt" => Ok(Self::Prompt(rest.to_string())),
            "preset" => {
                let value = required("preset <編號>")?;
                value
                    .parse()
                    .map(Self::Preset)
                    .map_err(|_| format!("無效的編號: {value}"))
            }
            "generate" => Ok(Self::Generate),
            "save" => Ok(Self::Save((!rest.is_empty()).then(|| rest.into()))),
            "status" => Ok(Self::Status),
            "reset" => Ok(Self::Reset),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("未知的指令: {other} (輸入 help 查看說明)")),
        }
    }
}

/// Rustyline helper with command completion, highlighting and hints.
struct ShellHelper {
    files: FilenameCompleter,
}

impl ShellHelper {
    fn new() -> Self {
        Self {
            files: FilenameCompleter::new(),
        }
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let head = &line[..pos];

        match head.split_once(' ') {
            None => {
                let candidates = COMMANDS
                    .iter()
                    .filter(|cmd| cmd.starts_with(head))
                    .map(|cmd| Pair {
                        display: cmd.to_string(),
                        replacement: cmd.to_string(),
                    })
                    .collect();
                Ok((0, candidates))
            }
            Some((name, _)) if PATH_COMMANDS.contains(&name) => {
                self.files.complete(line, pos, ctx)
            }
            Some(_) => Ok((0, vec![])),
        }
    }
}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let name = line.split(' ').next().unwrap_or_default();
        if COMMANDS.contains(&name) {
            Owned(format!("{}{}", name.bright_cyan(), &line[name.len()..]))
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.is_empty() || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for ShellHelper {}

fn print_help() {
    let rows = [
        ("photo <路徑>", "上傳人物照片並分析風格"),
        ("garment <路徑>", "上傳單品照片"),
        ("mode <text|item>", "切換試穿模式"),
        ("prompt <文字>", "描述想要的穿搭"),
        ("preset <編號>", "使用快速風格"),
        ("generate", "開始 AI 試穿"),
        ("save [路徑]", "儲存試穿結果"),
        ("status", "顯示目前狀態"),
        ("reset", "重新開始"),
        ("quit", "離開"),
    ];
    for (usage, description) in rows {
        println!(
            "  {} {}",
            format!("{usage:<18}").bright_cyan(),
            description.bright_black()
        );
    }
    println!("{}", "快速風格:".bright_black());
    for (index, preset) in STYLE_PRESETS.iter().enumerate() {
        println!("  {}. {}", index + 1, preset);
    }
}

fn skip_hint(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::NoPersonImage => "請先上傳人物照片 (photo <路徑>)",
        SkipReason::EmptyPrompt => "請輸入描述 (prompt <文字>) 或選擇快速風格 (preset <編號>)",
        SkipReason::NoGarmentImage => "請先上傳單品照片 (garment <路徑>)",
        SkipReason::Busy => "處理中，請稍候",
    }
}

async fn execute(
    workflow: &StylingWorkflow,
    config: &AppConfig,
    command: ShellCommand,
) -> Result<()> {
    match command {
        ShellCommand::Photo(path) => {
            let image = read_image(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            workflow.set_person_image(image).await;
            if let Some(text) = workflow.snapshot().await.outfit_analysis {
                render::print_analysis(&text);
            }
        }
        ShellCommand::Garment(path) => {
            let image = read_image(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            workflow.set_garment_image(image).await;
            println!("{}", "已設定單品照片".green());
        }
        ShellCommand::Mode(mode) => {
            workflow.set_mode(mode).await;
            println!("{} {}", "模式:".bright_black(), render::mode_label(mode));
        }
        ShellCommand::Prompt(text) => workflow.set_prompt_text(text).await,
        ShellCommand::Preset(number) => {
            let index = preset_index(number)?;
            workflow.apply_preset(index).await;
            println!(
                "{} {}",
                "描述:".bright_black(),
                workflow.snapshot().await.prompt_text
            );
        }
        ShellCommand::Generate => {
            let outcome = workflow.generate().await;
            if let Some(advice) = workflow.snapshot().await.match_advice {
                render::print_match_advice(&advice);
            }
            match outcome {
                GenerateOutcome::Completed => {
                    println!("{}", "試穿完成！輸入 save 儲存圖片".green());
                }
                GenerateOutcome::Skipped(reason) => {
                    println!("{}", skip_hint(reason).yellow());
                }
                GenerateOutcome::Failed(_) | GenerateOutcome::Superseded => {}
            }
        }
        ShellCommand::Save(path) => {
            let image = workflow
                .snapshot()
                .await
                .generated_image
                .context("尚未產生試穿結果")?;
            let target = path.unwrap_or_else(|| PathBuf::from(&config.output_file));
            write_image(&target, &image)
                .await
                .with_context(|| format!("Failed to save {}", target.display()))?;
            println!("已儲存試穿結果: {}", target.display());
        }
        ShellCommand::Status => render::print_status(&workflow.snapshot().await),
        ShellCommand::Reset => {
            workflow.reset().await;
            println!("{}", "已重設".green());
        }
        ShellCommand::Help => print_help(),
        ShellCommand::Quit => {}
    }
    Ok(())
}

pub async fn run(paths: &VoguePaths) -> Result<()> {
    let App {
        config,
        workflow,
        events,
    } = bootstrap(paths).await?;
    let printer = render::spawn_event_printer(events);

    let mut rl: Editor<ShellHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ShellHelper::new()));

    println!("{}", "=== Vogue AI 造型師 ===".bright_magenta().bold());
    println!("{}", "輸入 help 查看指令，quit 離開".bright_black());
    println!();

    loop {
        match rl.readline("vogue> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let command = match ShellCommand::parse(trimmed) {
                    Ok(command) => command,
                    Err(message) => {
                        println!("{}", message.yellow());
                        continue;
                    }
                };
                if command == ShellCommand::Quit {
                    println!("{}", "再見！".bright_green());
                    break;
                }
                if let Err(err) = execute(&workflow, &config, command).await {
                    eprintln!("{}", format!("Error: {err:#}").red());
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "再見！".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    drop(workflow);
    let _ = printer.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path_commands() {
        assert_eq!(
            ShellCommand::parse("photo  ~/me.jpg "),
            Ok(ShellCommand::Photo(PathBuf::from("~/me.jpg")))
        );
        assert_eq!(
            ShellCommand::parse("/garment coat.png"),
            Ok(ShellCommand::Garment(PathBuf::from("coat.png")))
        );
        assert!(ShellCommand::parse("photo").is_err());
        assert_eq!(ShellCommand::parse("save"), Ok(ShellCommand::Save(None)));
        assert_eq!(
            ShellCommand::parse("save out/look.png"),
            Ok(ShellCommand::Save(Some(PathBuf::from("out/look.png"))))
        );
    }

    #[test]
    fn test_parse_mode_and_preset() {
        assert_eq!(
            ShellCommand::parse("mode item"),
            Ok(ShellCommand::Mode(TryOnMode::ItemBased))
        );
        assert_eq!(
            ShellCommand::parse("MODE Text"),
            Ok(ShellCommand::Mode(TryOnMode::TextDescribed))
        );
        assert!(ShellCommand::parse("mode bogus").is_err());
        assert_eq!(ShellCommand::parse("preset 2"), Ok(ShellCommand::Preset(2)));
        assert!(ShellCommand::parse("preset two").is_err());
    }

    #[test]
    fn test_parse_prompt_keeps_full_text() {
        assert_eq!(
            ShellCommand::parse("prompt 復古 丹寧 外套"),
            Ok(ShellCommand::Prompt("復古 丹寧 外套".to_string()))
        );
        assert_eq!(
            ShellCommand::parse("prompt"),
            Ok(ShellCommand::Prompt(String::new()))
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        assert!(ShellCommand::parse("dance").is_err());
        assert_eq!(ShellCommand::parse("exit"), Ok(ShellCommand::Quit));
    }
}

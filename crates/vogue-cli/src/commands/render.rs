//! Terminal output for sessions and workflow events.

use colored::Colorize;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use vogue_core::{Session, TryOnMode, WorkflowEvent};

pub fn mode_label(mode: TryOnMode) -> &'static str {
    match mode {
        TryOnMode::TextDescribed => "文字描述",
        TryOnMode::ItemBased => "單品試穿",
    }
}

pub fn print_event(event: &WorkflowEvent) {
    match event {
        WorkflowEvent::LoadingStarted { label } => {
            println!("{}", format!("… {label}").yellow());
        }
        WorkflowEvent::LoadingFinished => {}
        WorkflowEvent::Notice { notice } => eprintln!("{}", notice.message.red()),
    }
}

/// Prints events as they arrive until every sender is dropped.
pub fn spawn_event_printer(mut events: UnboundedReceiver<WorkflowEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            print_event(&event);
        }
    })
}

pub fn print_analysis(text: &str) {
    println!("{}", "風格分析".bright_magenta().bold());
    for line in text.lines() {
        println!("{}", line.bright_blue());
    }
}

pub fn print_match_advice(text: &str) {
    println!("{}", "搭配建議".bright_magenta().bold());
    for line in text.lines() {
        println!("{}", line.bright_blue());
    }
}

fn presence(present: bool) -> colored::ColoredString {
    if present {
        "✓".green()
    } else {
        "-".bright_black()
    }
}

pub fn print_status(session: &Session) {
    println!("{} {:?}", "階段:".bright_black(), session.phase());
    println!("{} {}", "模式:".bright_black(), mode_label(session.mode));
    println!(
        "{} {}",
        "人物照片:".bright_black(),
        presence(session.person_image.is_some())
    );
    println!(
        "{} {}",
        "單品照片:".bright_black(),
        presence(session.garment_image.is_some())
    );
    println!(
        "{} {}",
        "試穿結果:".bright_black(),
        presence(session.generated_image.is_some())
    );
    println!(
        "{} {}",
        "可以試穿:".bright_black(),
        presence(session.can_generate())
    );
    if !session.prompt_text.is_empty() {
        println!("{} {}", "描述:".bright_black(), session.prompt_text);
    }
    if let Some(label) = session.loading_label.filter(|_| session.is_loading) {
        println!("{} {}", "處理中:".bright_black(), label.to_string().yellow());
    }
    if let Some(analysis) = &session.outfit_analysis {
        print_analysis(analysis);
    }
    if let Some(advice) = &session.match_advice {
        print_match_advice(advice);
    }
}

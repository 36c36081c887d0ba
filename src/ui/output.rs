use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn status(icon: &str, label: &str, value: &str) {
    println!("{} {}: {}", icon, label.style(theme().dim.clone()), value);
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn dim(text: &str) -> String {
    text.style(theme().dim.clone()).to_string()
}

pub fn muted(text: &str) -> String {
    text.style(theme().muted.clone()).to_string()
}

/// Similarity score, three decimals
pub fn score(value: f32) -> String {
    format!("{:.3}", value).style(theme().score.clone()).to_string()
}

/// A retrieved chunk: location line, then indented content
pub fn chunk(rank: usize, path: &str, chunk_index: usize, similarity: f32, content: &str) {
    println!(
        "{} {} {}{} {}",
        format!("{:>2}.", rank).style(theme().dim.clone()),
        Icons::FILE,
        path.style(theme().header.clone()),
        muted(&format!("#{}", chunk_index)),
        score(similarity)
    );
    for line in content.lines().take(8) {
        println!("     {}", muted(line));
    }
}

pub fn dependency(path: &str, neighbors: &[String]) {
    let targets = if neighbors.is_empty() {
        muted("(none)")
    } else {
        neighbors.join(", ")
    };
    println!("{} {} -> {}", Icons::LINK.style(theme().info.clone()), path, targets);
}

pub fn skipped(path: &str, reason: &str) {
    println!("{} {} {}", Icons::SKIP, path, muted(reason));
}

pub fn timing(elapsed: &str) {
    println!("{} {}", Icons::CLOCK.style(theme().dim.clone()), elapsed);
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}

/// Pretty JSON on stdout, for `--json`
pub fn json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

use super::{Cli, OutputFormat};
use crate::error::{Result, TranslateError};
use crate::{load_rules, translate_project, TranslationStats, TranslatorOptions};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

/// Events arriving this close together trigger a single run.
const WATCH_SETTLE: Duration = Duration::from_millis(200);

fn input_path(matches: &clap::ArgMatches) -> Result<PathBuf> {
    matches
        .get_one::<String>("input")
        .map(PathBuf::from)
        .ok_or_else(|| TranslateError::InvalidFormat {
            message: "missing input directory".to_string(),
        })
}

fn watch_error(e: notify::Error) -> TranslateError {
    TranslateError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("File watcher error: {}", e),
    ))
}

// --- TRANSLATE ---
pub fn handle_translate_command(cli: &Cli, matches: &clap::ArgMatches) -> Result<()> {
    let res_dir = input_path(matches)?;
    let output_dir = matches
        .get_one::<String>("output")
        .cloned()
        .or_else(|| cli.config.output_directory.clone())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("out"));
    let options = cli.build_translator_options(matches)?;

    if matches.get_flag("watch") {
        watch_and_translate(&res_dir, &output_dir, &options)
    } else {
        let stats = translate_once(&res_dir, &output_dir, &options)?;
        if matches.get_flag("stats") {
            print_stats(&stats)?;
        }
        Ok(())
    }
}

fn translate_once(res_dir: &Path, output_dir: &Path, options: &TranslatorOptions) -> Result<TranslationStats> {
    println!(
        "🔨 Translating {} -> {} ({})",
        res_dir.display(),
        output_dir.display(),
        options.target.name()
    );
    let stats = translate_project(res_dir, Some(output_dir), options)?;

    if stats.failure_count == 0 {
        println!("✅ Translation successful!");
    } else {
        println!("⚠️  Translation finished with {} failed layout files", stats.failure_count);
        for failure in &stats.failures {
            println!("   ❌ {}", failure);
        }
    }
    println!("   Layouts: {} ({} files)", stats.layout_count, stats.variant_count);
    println!("   Files written: {}", stats.file_count);
    println!("   Time: {}ms", stats.translate_time_ms);
    Ok(stats)
}

fn print_stats(stats: &TranslationStats) -> Result<()> {
    let json = serde_json::to_string_pretty(stats).map_err(|e| TranslateError::InvalidFormat {
        message: format!("Cannot serialize statistics: {}", e),
    })?;
    println!("{}", json);
    Ok(())
}

fn watch_and_translate(res_dir: &Path, output_dir: &Path, options: &TranslatorOptions) -> Result<()> {
    println!("👀 Watching {} for changes...", res_dir.display());

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                if let Err(e) = tx.send(event) {
                    eprintln!("Watch error: {}", e);
                }
            }
        },
        notify::Config::default(),
    )
    .map_err(watch_error)?;
    watcher
        .watch(res_dir, RecursiveMode::Recursive)
        .map_err(watch_error)?;

    if let Err(e) = translate_once(res_dir, output_dir, options) {
        eprintln!("❌ Initial translation failed: {}", e);
    }

    loop {
        match rx.recv() {
            Ok(event) => {
                log::debug!("Change detected: {:?}", event.paths);
                while rx.recv_timeout(WATCH_SETTLE).is_ok() {}
                println!("🔄 Resources changed, translating again...");
                if let Err(e) = translate_once(res_dir, output_dir, options) {
                    eprintln!("❌ Translation failed: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Watch error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

// --- CHECK ---
pub fn handle_check_command(cli: &Cli, matches: &clap::ArgMatches) -> Result<()> {
    let res_dir = input_path(matches)?;
    let options = TranslatorOptions {
        fail_fast: false,
        ..cli.build_translator_options(matches)?
    };
    println!("🔍 Checking {}", res_dir.display());

    let stats = translate_project(&res_dir, None, &options)?;
    let total = stats.variant_count + stats.failure_count;
    for failure in &stats.failures {
        println!("❌ {}", failure);
    }

    println!("\n📊 Check Summary:");
    println!("   Layout files: {}", total);
    println!("   Files with errors: {}", stats.failure_count);
    if total > 0 {
        println!(
            "   Success rate: {:.1}%",
            stats.variant_count as f64 / total as f64 * 100.0
        );
    }

    if stats.failure_count > 0 {
        Err(TranslateError::InvalidFormat {
            message: format!("{} of {} layout files failed", stats.failure_count, total),
        })
    } else {
        println!("✅ No issues found");
        Ok(())
    }
}

// --- RULES ---
pub fn handle_rules_command(cli: &Cli, matches: &clap::ArgMatches) -> Result<()> {
    let options = cli.build_translator_options(matches)?;
    let registry = load_rules(&options)?;
    let format = matches
        .get_one::<OutputFormat>("format")
        .cloned()
        .unwrap_or(OutputFormat::Text);

    match format {
        OutputFormat::Json => {
            let listing = serde_json::json!({
                "target": options.target,
                "elements": registry.element_rules().collect::<Vec<_>>(),
                "attributes": registry.attribute_rules().collect::<Vec<_>>(),
            });
            let json = serde_json::to_string_pretty(&listing).map_err(|e| TranslateError::InvalidFormat {
                message: format!("Cannot serialize rules: {}", e),
            })?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!(
                "📋 {} element rules, {} attribute rules for {}",
                registry.element_count(),
                registry.attribute_count(),
                options.target.name()
            );
            println!("\nElements:");
            for rule in registry.element_rules() {
                let parent = rule.parent.as_deref().map(|p| format!(" : {p}")).unwrap_or_default();
                let template = rule
                    .template
                    .as_ref()
                    .map(|t| format!(" -> <{}>", t.name))
                    .unwrap_or_default();
                println!("   {}{}{}  [{} predicates, {}]", rule.id, parent, template, rule.priority(), rule.origin);
            }
            println!("\nAttributes:");
            for rule in registry.attribute_rules() {
                let guard = rule.equals.as_deref().map(|v| format!(" = {v}")).unwrap_or_default();
                println!(
                    "   {} on {} ({}{})  [{} emissions, {}]",
                    rule.id,
                    rule.element,
                    rule.value_type,
                    guard,
                    rule.emit.len(),
                    rule.origin
                );
            }
        }
    }
    Ok(())
}

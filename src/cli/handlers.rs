// FILE: src/cli/handlers.rs
use crate::{
    animation, compile_page_file_with_options, CompilationStats, CompilerError, CompilerOptions,
    ModuleRegistry, PageDocument, Result,
};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Instant;

fn required<'a>(matches: &'a clap::ArgMatches, id: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(id)
        .ok_or_else(|| CompilerError::invalid_format(format!("Missing required argument '{}'", id)))
}

// --- COMPILE ---
pub fn handle_compile_command(cli: &super::EnhancedCli, matches: &clap::ArgMatches) -> Result<()> {
    let input_path = required(matches, "input")?;
    let output_path = cli.output_path(input_path, matches).to_string_lossy().into_owned();
    let options = cli.build_compiler_options(matches)?;

    if let Some(parent) = Path::new(&output_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    if matches.get_flag("watch") {
        watch_and_compile(input_path, &output_path, options)
    } else {
        compile_single_file(input_path, &output_path, options, matches.get_flag("stats"))
    }
}

fn compile_single_file(
    input_path: &str,
    output_path: &str,
    options: CompilerOptions,
    show_stats: bool,
) -> Result<()> {
    println!("🔨 Compiling {} -> {}", input_path, output_path);

    let compile_start = Instant::now();
    let stats = compile_page_file_with_options(input_path, output_path, options)?;
    let compile_time = compile_start.elapsed();

    println!("✅ Compilation successful!");
    println!("   Modules: {}", stats.module_count);
    println!("   Output: {} bytes", stats.output_size);
    println!("   Time: {:.2}ms", compile_time.as_millis());

    if stats.skipped_count > 0 {
        println!("   ⚠️  Skipped {} modules with unknown types", stats.skipped_count);
    }

    if show_stats {
        print_detailed_stats(&stats)?;
    }

    Ok(())
}

fn watch_and_compile(
    input_path: &str,
    output_path: &str,
    options: CompilerOptions,
) -> Result<()> {
    println!("👀 Watching {} for changes...", input_path);

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
    .map_err(|e| {
        CompilerError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to create file watcher: {}", e),
        ))
    })?;

    watcher
        .watch(Path::new(input_path), RecursiveMode::NonRecursive)
        .map_err(|e| {
            CompilerError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to watch file: {}", e),
            ))
        })?;

    if let Err(e) = compile_page_file_with_options(input_path, output_path, options.clone()) {
        eprintln!("❌ Initial compilation failed: {}", e);
    } else {
        println!("✅ Initial compilation successful");
    }

    loop {
        match rx.recv() {
            Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                println!("🔄 File changed, recompiling...");
                match compile_page_file_with_options(input_path, output_path, options.clone()) {
                    Ok(stats) => {
                        println!(
                            "✅ Recompiled successfully ({} modules, {} bytes, {}ms)",
                            stats.module_count, stats.output_size, stats.compile_time_ms
                        );
                    }
                    Err(e) => eprintln!("❌ Compilation failed: {}", e),
                }
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Watch error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

// --- CHECK ---
pub fn handle_check_command(matches: &clap::ArgMatches) -> Result<()> {
    let input_path = required(matches, "input")?;
    let recursive = matches.get_flag("recursive");
    let registry = ModuleRegistry::builtin();

    if recursive && Path::new(input_path).is_dir() {
        check_directory_recursive(input_path, &registry)
    } else {
        check_single_file(Path::new(input_path), &registry)
    }
}

/// Parse a page and reject module types the registry does not know.
fn check_page(path: &Path, registry: &ModuleRegistry) -> Result<usize> {
    let page = PageDocument::from_file(path)?;
    let unknown = page.unknown_kinds(registry);
    if let Some(kind) = unknown.first() {
        return Err(CompilerError::page(
            path.display().to_string(),
            format!("{} ({} unknown in total)", CompilerError::unknown_module(kind.as_str()), unknown.len()),
        ));
    }
    Ok(page.modules.len())
}

fn check_single_file(path: &Path, registry: &ModuleRegistry) -> Result<()> {
    println!("🔍 Checking {}", path.display());
    match check_page(path, registry) {
        Ok(modules) => {
            println!("✅ {} - {} modules, no issues found", path.display(), modules);
            Ok(())
        }
        Err(e) => {
            println!("❌ {} - {}", path.display(), e);
            Err(e)
        }
    }
}

fn check_directory_recursive(dir_path: &str, registry: &ModuleRegistry) -> Result<()> {
    let mut total_files = 0;
    let mut error_files = 0;

    for entry in walkdir::WalkDir::new(dir_path) {
        let entry = entry.map_err(|e| {
            CompilerError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Directory traversal error: {}", e),
            ))
        })?;
        if entry.file_type().is_file() {
            if let Some(ext) = entry.path().extension() {
                if ext == "json" {
                    total_files += 1;
                    if check_single_file(entry.path(), registry).is_err() {
                        error_files += 1;
                    }
                }
            }
        }
    }

    println!("\n📊 Check Summary:");
    println!("   Total files: {}", total_files);
    println!("   Files with errors: {}", error_files);
    if total_files > 0 {
        println!(
            "   Success rate: {:.1}%",
            (total_files - error_files) as f64 / total_files as f64 * 100.0
        );
    }

    if error_files > 0 {
        Err(CompilerError::page(
            dir_path,
            format!("{} files have errors", error_files),
        ))
    } else {
        Ok(())
    }
}

// --- MODULES ---
pub fn handle_modules_command(matches: &clap::ArgMatches) -> Result<()> {
    let registry = ModuleRegistry::builtin();

    if matches.get_flag("json") {
        let descriptors: Vec<_> = registry.descriptors().collect();
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }

    println!("📦 Registered modules ({}):", registry.len());
    for descriptor in registry.descriptors() {
        println!(
            "   {:<12} {:<12} {} typography, {} custom CSS targets, {} inner elements",
            descriptor.kind,
            descriptor.category,
            descriptor.typography_fields.len(),
            descriptor.custom_css_targets.len(),
            descriptor.inner_elements.len()
        );
    }
    Ok(())
}

// --- KEYFRAMES ---
pub fn handle_keyframes_command(cli: &super::EnhancedCli, matches: &clap::ArgMatches) -> Result<()> {
    let options = cli.build_compiler_options(matches)?;
    print!("{}", animation::library(&options.animation_prefix).to_css(options.format));
    Ok(())
}

// --- HELPERS ---
fn print_detailed_stats(stats: &CompilationStats) -> Result<()> {
    println!("\n📊 Detailed Compilation Statistics:");
    println!("   Source size: {} bytes", stats.source_size);
    println!("   Output size: {} bytes", stats.output_size);
    println!("   Compile time: {}ms", stats.compile_time_ms);
    println!("\n   Page breakdown:");
    println!("     Modules: {}", stats.module_count);
    println!("     Keyframes: {}", stats.keyframes_count);
    if stats.skipped_count > 0 {
        println!("     Skipped: {}", stats.skipped_count);
    }
    Ok(())
}

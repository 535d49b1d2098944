// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;

use liveset::playback::{ClockDriver, LogSink, SystemAudioClock};
use liveset::timeline::{FileStore, MemoryStore, NewSegment};
use liveset::TimelineEngine;

fn print_usage() {
    println!("LIVESET - Timeline scheduler for live-coded patterns");
    println!();
    println!("Usage: liveset [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --demo [SECS]           Play a built-in two-track arrangement (default 10s)");
    println!("  --list-songs <STORE>    List songs in a JSON store file");
    println!("  --play <STORE> [SECS]   Play the current song from a store (default 10s)");
    println!("  --help                  Show this help message");
}

async fn run_engine(engine: TimelineEngine, secs: f64) -> Result<()> {
    let engine = Arc::new(Mutex::new(engine));
    if let Ok(mut engine) = engine.lock() {
        engine.play();
    }

    let driver = ClockDriver::spawn_default(engine.clone());
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    driver.shutdown().await;

    if let Ok(mut engine) = engine.lock() {
        engine.stop();
    }
    Ok(())
}

async fn run_demo(secs: f64) -> Result<()> {
    let mut engine = TimelineEngine::new(
        Box::new(MemoryStore::new()),
        Box::new(SystemAudioClock::new()),
        Box::new(LogSink::new()),
    );

    let drums = engine.add_track(Some("Drums"));
    let chords = engine.add_track(Some("Chords"));
    engine.add_segment(&drums, NewSegment::new("s(\"bd sd\")").at(0.0).lasting(8.0))?;
    engine.add_segment(
        &drums,
        NewSegment::new("s(\"bd*4, hh*8\")").at(8.0).lasting(8.0),
    )?;
    engine.add_segment(
        &chords,
        NewSegment::new("note(\"c e g\").s(\"piano\")").at(4.0).lasting(12.0),
    )?;

    println!("Playing demo arrangement for {}s...", secs);
    run_engine(engine, secs).await?;
    println!("Demo complete!");
    Ok(())
}

async fn play_store(path: &str, secs: f64) -> Result<()> {
    let store = FileStore::open(path)?;
    let engine = TimelineEngine::new(
        Box::new(store),
        Box::new(SystemAudioClock::new()),
        Box::new(LogSink::new()),
    );

    println!(
        "Playing \"{}\" ({} tracks) for {}s...",
        engine.session().song().name,
        engine.tracks().len(),
        secs
    );
    run_engine(engine, secs).await?;
    println!("Playback complete!");
    Ok(())
}

fn list_songs(path: &str) -> Result<()> {
    let store = FileStore::open(path)?;
    let engine = TimelineEngine::new(
        Box::new(store),
        Box::new(SystemAudioClock::new()),
        Box::new(LogSink::new()),
    );

    println!("Songs (most recently updated first):");
    for song in engine.list_songs() {
        println!("  {}  {}  (updated {})", song.id, song.name, song.updated_at);
    }
    Ok(())
}

fn parse_secs(args: &[String], index: usize) -> f64 {
    args.get(index).and_then(|s| s.parse().ok()).unwrap_or(10.0)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("LIVESET - Timeline scheduler for live-coded patterns");
        println!("Run with --help for usage information");
        return Ok(());
    }

    match args[1].as_str() {
        "--demo" => {
            run_demo(parse_secs(&args, 2)).await?;
        }
        "--list-songs" => {
            if args.len() < 3 {
                eprintln!("Error: --list-songs requires a store file path");
                std::process::exit(1);
            }
            list_songs(&args[2])?;
        }
        "--play" => {
            if args.len() < 3 {
                eprintln!("Error: --play requires a store file path");
                std::process::exit(1);
            }
            play_store(&args[2], parse_secs(&args, 3)).await?;
        }
        "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Unknown option: {}", args[1]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}

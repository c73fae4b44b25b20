use base64::{engine::general_purpose, Engine};
use clap::Parser;
use log::{info, LevelFilter};
use prefetch::{
    parse_prefetch_file, parse_toml_data, parse_toml_file, prefetch_collection,
    structs::{artifacts::PrefetchOptions, toml::Output, toml::PrefetchToml},
    PrefetchCollection, TomlError,
};
use simplelog::{Config, SimpleLogger};
use std::collections::HashMap;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Full path to TOML collector
    #[clap(short, long, value_parser)]
    toml: Option<String>,

    /// Base64 encoded TOML file
    #[clap(short, long, value_parser)]
    data: Option<String>,

    /// Directory of prefetch files to parse
    #[clap(long, value_parser)]
    dir: Option<String>,

    /// Parse a single prefetch file and print it as JSON
    #[clap(short, long, value_parser)]
    file: Option<String>,

    /// Output format for --dir: json, jsonl or sqlite
    #[clap(long, default_value = "jsonl")]
    format: String,

    /// Output directory for --dir
    #[clap(short, long, default_value = "./tmp")]
    output: String,

    /// Volume serial to drive letter mapping, e.g. D49D126F=C
    #[clap(long, value_parser = parse_drive)]
    drive: Vec<(String, String)>,
}

fn parse_drive(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((serial, letter)) if !serial.is_empty() && !letter.is_empty() => {
            Ok((serial.to_string(), letter.to_string()))
        }
        _ => Err(format!("expected SERIAL=LETTER, got {value}")),
    }
}

fn main() {
    let args = Args::parse();
    println!("[pfparse] Starting prefetch collection!");

    let collection_results = if let Some(path) = args.file {
        let _ = SimpleLogger::init(LevelFilter::Warn, Config::default());
        print_prefetch(&path);
        return;
    } else if let Some(toml) = args.toml {
        parse_toml_file(&toml)
    } else if let Some(data) = args.data {
        let toml_data_results = general_purpose::STANDARD.decode(&data);
        let toml_data = match toml_data_results {
            Ok(results) => results,
            Err(err) => {
                println!("[pfparse] Failed to base64 decode TOML collector {data}, error: {err:?}");
                return;
            }
        };
        parse_toml_data(&toml_data)
    } else if let Some(dir) = args.dir {
        let collection = PrefetchToml {
            output: Output {
                name: String::from("prefetch_collection"),
                directory: args.output,
                format: args.format.to_lowercase(),
                logging: None,
            },
            prefetch: PrefetchOptions {
                alt_dir: Some(dir),
                drives: args.drive.into_iter().collect::<HashMap<_, _>>(),
            },
        };
        prefetch_collection(&collection)
    } else {
        println!("[pfparse] No TOML file, data, or directory provided!");
        return;
    };

    report(collection_results);
}

fn report(collection_results: Result<PrefetchCollection, TomlError>) {
    match collection_results {
        Ok(collection) => {
            info!("[pfparse] Collection success");
            println!("[pfparse] {}", collection.summary());
            for path in &collection.failed {
                println!("[pfparse] Failed: {path}");
            }
            println!("[pfparse] Finished prefetch collection!");
        }
        Err(err) => println!("[pfparse] Failed to collect prefetch: {err:?}"),
    }
}

fn print_prefetch(path: &str) {
    match parse_prefetch_file(path) {
        Ok(record) => match serde_json::to_string_pretty(&record) {
            Ok(text) => println!("{text}"),
            Err(err) => println!("[pfparse] Failed to serialize {path}: {err:?}"),
        },
        Err(err) => println!("[pfparse] Failed to parse {path}: {err}"),
    }
}

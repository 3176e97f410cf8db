use std::path::PathBuf;
use std::process::ExitCode;

use bang_lexer::tokenize;
use bang_types::analyze;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bang", version, about = "Front end for the bang language: tokens, AST and types")]
struct Opt {
    /// Source file
    #[arg(value_name = "FILE", required_unless_present = "eval", conflicts_with = "eval")]
    file: Option<PathBuf>,

    /// Program text given inline
    #[arg(short = 'e', long = "eval")]
    eval: Option<String>,

    /// Print KIND:text:line for every token and stop
    #[arg(long = "dump-tokens", default_value_t = false)]
    dump_tokens: bool,

    /// Print the parsed, untyped AST as JSON and stop
    #[arg(long = "dump-ast", default_value_t = false)]
    dump_ast: bool,

    /// Print the validated AST as JSON
    #[arg(long = "dump-typed-ast", default_value_t = false)]
    dump_typed_ast: bool,

    /// Output format for the binding summary
    #[arg(long = "format", value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Debug logging unless RUST_LOG says otherwise
    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct Binding<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    ty: String,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(opt: &Opt) -> Result<String, String> {
    match (&opt.eval, &opt.file) {
        (Some(code), _) => Ok(code.clone()),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| format!("error: cannot read {}: {e}", path.display())),
        (None, None) => Err("error: no input given".into()),
    }
}

fn run(opt: &Opt) -> Result<(), Box<dyn std::error::Error>> {
    let src = read_source(opt)?;
    debug!(bytes = src.len(), "source loaded");

    if opt.dump_tokens {
        for tok in tokenize(&src) {
            println!("{}:{}:{}", tok.kind, tok.text.escape_default(), tok.line);
        }
        return Ok(());
    }
    if opt.dump_ast {
        let program = bang_parser::parse(&src)?;
        println!("{}", serde_json::to_string_pretty(&program)?);
        return Ok(());
    }

    let analysis = analyze(&src)?;
    debug!(
        values = analysis.counts.values,
        functions = analysis.counts.functions,
        "program validated"
    );
    if opt.dump_typed_ast {
        println!("{}", serde_json::to_string_pretty(&analysis.program)?);
        return Ok(());
    }
    let bindings = analysis.bindings();
    match opt.format {
        Format::Json => {
            let out: Vec<Binding> = bindings
                .into_iter()
                .map(|(name, ty)| Binding { name, ty: ty.to_string() })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Text => {
            for (name, ty) in bindings {
                println!("{name} : {ty}");
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let opt = Opt::parse();
    init_logging(opt.verbose);
    match run(&opt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // compile errors already read "error on line N: ..."
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

use sponge::bytecode::Bytecode;
use sponge::bytecode::disasm::print_bc;
use sponge::bytecode::stack_check::check_program;
use sponge::frontend::Lexer;
use sponge::frontend::token_dumper::TokenDumper;
use sponge::{Engine, LangPack, PackLoader, Target, Vm};

#[derive(Parser, Debug)]
#[command(name = "sponge")]
#[command(about = "Absorb a language pack and evaluate, transpile or assemble with it")]
struct Cli {
    /// Schema the pack is checked against
    #[arg(long, global = true)]
    schema: Option<PathBuf>,

    /// Language pack to absorb
    #[arg(long, global = true)]
    pack: Option<PathBuf>,

    /// Read the pack with the schema-matched legacy loader (needs --schema)
    #[arg(long, global = true)]
    legacy: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate an expression
    Run { source: String },

    /// Lower an expression into a program for another language
    Transpile {
        source: String,

        #[arg(long, default_value = "go")]
        target: Target,
    },

    /// Show the tokens of an expression
    Tokens {
        source: String,

        #[arg(long)]
        no_color: bool,

        #[arg(long)]
        pretty: bool,
    },

    /// Assemble and run a bytecode program (`.bc` files are read as postcard)
    Asm {
        file: PathBuf,

        /// Print the listing before running
        #[arg(long)]
        disasm: bool,

        /// Run the static stack check before running
        #[arg(long)]
        check: bool,

        /// Write the assembled program as postcard instead of running it
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the loaded pack
    Pack,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();

    let cli = Cli::parse();
    let pack = load_pack(&cli);

    let mut engine = Engine::new();
    if let Some(pack) = &pack {
        if let Err(e) = engine.mount(pack) {
            fail("Pack error", e);
        }
    }

    match cli.command {
        Command::Run { source } => match engine.run(&source) {
            Ok(value) => println!("{}", value),
            Err(e) => fail("Error", e),
        },
        Command::Transpile { source, target } => match engine.transpile_to(&source, target) {
            Ok(text) => print!("{}", text),
            Err(e) => fail("Parse error", e),
        },
        Command::Tokens {
            source,
            no_color,
            pretty,
        } => dump_tokens(&engine, &source, no_color, pretty),
        Command::Asm {
            file,
            disasm,
            check,
            out,
        } => run_asm(&engine, &file, disasm, check, out.as_deref()),
        Command::Pack => match &pack {
            Some(pack) => print_pack(pack),
            None => fail("Error", "no pack given, use --pack <FILE>"),
        },
    }
}

fn load_pack(cli: &Cli) -> Option<LangPack> {
    let pack_path = cli.pack.as_ref()?;

    let result = match (&cli.schema, cli.legacy) {
        (Some(schema), true) => PackLoader::parse_legacy(schema, pack_path),
        (None, true) => fail("Error", "--legacy needs --schema <FILE>"),
        (Some(schema), false) => PackLoader::parse(schema, pack_path),
        (None, false) => PackLoader::load(pack_path),
    };

    match result {
        Ok(pack) => {
            debug!(language = %pack.name, "pack ready");
            Some(pack)
        }
        Err(e) => fail("Pack error", e),
    }
}

fn dump_tokens(engine: &Engine, source: &str, no_color: bool, pretty: bool) {
    let mut lexer = Lexer::new(source, engine.grammar()).with_max_tokens(engine.config().max_tokens);

    match lexer.tokenize() {
        Ok(tokens) => {
            let mut dumper = TokenDumper::new();

            if no_color {
                dumper = dumper.no_color();
            }
            if pretty {
                dumper = dumper.pretty();
            }

            dumper.dump(&tokens);
        }
        Err(e) => fail("Lexer error", e),
    }
}

fn run_asm(engine: &Engine, file: &Path, disasm: bool, check: bool, out: Option<&Path>) {
    let program = if file.extension().and_then(|e| e.to_str()) == Some("bc") {
        let bytes = fs::read(file).unwrap_or_else(|e| fail_read(file, e));
        match Bytecode::from_bytes(&bytes) {
            Ok(bc) => bc,
            Err(e) => fail("Decode error", e),
        }
    } else {
        let text = fs::read_to_string(file).unwrap_or_else(|e| fail_read(file, e));
        match engine.assemble(&text) {
            Ok(bc) => bc,
            Err(e) => fail("Assembly error", e),
        }
    };

    if disasm {
        print_bc(&program);
    }

    if check {
        if let Err(e) = check_program(&program) {
            fail("Check error", e);
        }
    }

    if let Some(out) = out {
        let bytes = match program.to_bytes() {
            Ok(b) => b,
            Err(e) => fail("Encode error", e),
        };
        if let Err(e) = fs::write(out, bytes) {
            fail(&format!("Failed to write '{}'", out.display()), e);
        }
        return;
    }

    match Vm::new().run(&program) {
        Ok(value) => println!("{}", value),
        Err(e) => fail("Runtime error", e),
    }
}

fn print_pack(pack: &LangPack) {
    println!("language: {}", pack.name);
    let tables = [
        ("tokens", &pack.tokens),
        ("evaluate", &pack.eval_rules),
        ("ir", &pack.ir_rules),
        ("bytecode", &pack.bytecode),
    ];
    println!("operators:");
    for (op, prec) in &pack.precedence {
        println!("  {}: {}", op, prec);
    }
    for (name, table) in tables {
        println!("{}:", name);
        for (k, v) in table {
            println!("  {}: {:?}", k, v);
        }
    }
}

fn fail_read(file: &Path, e: std::io::Error) -> ! {
    fail(&format!("Failed to read '{}'", file.display()), e)
}

fn fail(context: &str, e: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", context, e);
    process::exit(1);
}

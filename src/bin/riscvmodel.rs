//! `riscvmodel` CLI: disassembles machine words, generates random assembly against the
//! instruction registry, and round-trips that assembly through an external toolchain (§6).

use std::fs;
use std::io::Write;
use std::process::Command;

use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use riscvmodel::error::RiscvError;
use riscvmodel::instruction::Instruction;
use riscvmodel::registry;
use riscvmodel::variant::Variant;

#[derive(Parser)]
#[command(author, version, about = "A configurable RISC-V instruction codec, simulator and disassembler")]
struct Cli {
    /// ISA variant to decode/generate under (e.g. "RV32IMAC").
    #[arg(long, global = true, default_value = "RV32I")]
    variant: String,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Disassemble machine words.
    Disassemble {
        #[command(subcommand)]
        source: DisassembleSource,
    },
    /// Print N random assembly lines.
    RandomAsm {
        /// Number of instructions to generate.
        #[arg(default_value_t = 10)]
        n: usize,
        /// Restrict to this mnemonic; may be given more than once.
        #[arg(short = 'i', long = "insn")]
        insns: Vec<String>,
    },
    /// Round-trip random assembly through an external compiler.
    RandomAsmCheck {
        /// Number of instructions to generate.
        #[arg(default_value_t = 100)]
        n: usize,
        /// Restrict to this mnemonic; may be given more than once.
        #[arg(short = 'i', long = "insn")]
        insns: Vec<String>,
        /// Test each restricted mnemonic in its own run instead of one mixed run.
        #[arg(short = 's')]
        separate: bool,
        /// Compiler executable to invoke on the generated assembly.
        #[arg(short = 'c', long = "cc", default_value = "riscv32-unknown-elf-gcc")]
        cc: String,
    },
    /// Print a variant's xlen, register count and extension table.
    VariantDescribe {
        /// ISA string to describe (e.g. "RV64GC").
        name: String,
    },
}

#[derive(Subcommand)]
enum DisassembleSource {
    /// Decode instructions given as command-line hexstrings.
    Hexstring {
        /// Instruction(s) as hexstring(s) (with or without a leading "0x").
        #[arg(required = true)]
        insn: Vec<String>,
    },
    /// Decode instructions from a flat binary object file.
    Objfile {
        /// Path to the object file.
        filename: String,
        /// objcopy executable used to extract a flat binary from `filename`.
        #[arg(long, default_value = "riscv32-unknown-elf-objcopy")]
        objcopy: String,
    },
}

fn main() -> Result<(), RiscvError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let variant = Variant::parse(&cli.variant)?;

    match cli.command {
        Cmd::Disassemble { source } => disassemble(source, &variant),
        Cmd::RandomAsm { n, insns } => random_asm(n, &insns, &variant),
        Cmd::RandomAsmCheck { n, insns, separate, cc } => random_asm_check(n, &insns, separate, &cc, &variant),
        Cmd::VariantDescribe { name } => {
            let described = Variant::parse(&name)?;
            println!("{}", described.describe());
            Ok(())
        }
    }
}

fn disassemble(source: DisassembleSource, variant: &Variant) -> Result<(), RiscvError> {
    match source {
        DisassembleSource::Hexstring { insn } => {
            for hex in &insn {
                let trimmed = hex.strip_prefix("0x").unwrap_or(hex);
                let Ok(word) = u32::from_str_radix(trimmed, 16) else {
                    println!("Cannot decode {hex}, invalid instruction");
                    continue;
                };
                match Instruction::decode(word, variant) {
                    Ok(decoded) => println!("{decoded}"),
                    Err(_) => println!("Cannot decode {word:08x}, invalid instruction"),
                }
            }
            Ok(())
        }
        DisassembleSource::Objfile { filename, objcopy } => {
            let temp = std::env::temp_dir().join(format!("riscvmodel-{}.bin", std::process::id()));
            let status = Command::new(&objcopy).args(["-O", "binary", &filename, &temp.to_string_lossy()]).status()?;
            if !status.success() {
                tracing::warn!(?objcopy, "objcopy exited with failure status");
            }
            let bytes = fs::read(&temp)?;
            let _ = fs::remove_file(&temp);
            for chunk in bytes.chunks_exact(4) {
                let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                match Instruction::decode(word, variant) {
                    Ok(decoded) => println!("{decoded}"),
                    Err(_) => println!("Cannot decode {word:08x}, invalid instruction"),
                }
            }
            Ok(())
        }
    }
}

/// The set of mnemonics a `-i` filter should generate from: the user's explicit list if given,
/// otherwise every mnemonic the variant supports (`random.py`'s `get_mnenomics()` default).
fn mnemonic_pool(insns: &[String], variant: &Variant) -> Vec<&'static str> {
    if insns.is_empty() {
        registry::get_insns(variant).iter().map(|d| d.mnemonic).collect()
    } else {
        insns.iter().filter_map(|m| registry::reverse_lookup(m)).map(|d| d.mnemonic).collect()
    }
}

fn random_instructions(n: usize, pool: &[&'static str], variant: &Variant) -> Vec<Instruction> {
    if pool.is_empty() {
        return Vec::new();
    }
    let mut rng = rand::rngs::StdRng::from_entropy();
    (0..n)
        .filter_map(|_| {
            let mnemonic = pool[rng.gen_range(0..pool.len())];
            Instruction::random(mnemonic, variant, &mut rng)
        })
        .collect()
}

fn random_asm(n: usize, insns: &[String], variant: &Variant) -> Result<(), RiscvError> {
    let pool = mnemonic_pool(insns, variant);
    if pool.is_empty() {
        eprintln!("no mnemonic in the restriction list is known for this variant");
        return Ok(());
    }
    for insn in random_instructions(n, &pool, variant) {
        println!("{insn}");
    }
    Ok(())
}

fn random_asm_check(n: usize, insns: &[String], separate: bool, cc: &str, variant: &Variant) -> Result<(), RiscvError> {
    let pool = mnemonic_pool(insns, variant);
    if pool.is_empty() {
        eprintln!("no mnemonic in the restriction list is known for this variant");
        return Ok(());
    }
    let runs: Vec<Vec<&'static str>> = if separate { pool.iter().map(|m| vec![*m]).collect() } else { vec![pool] };

    let mut all_passed = true;
    for run in runs {
        println!("Check {n} instructions from {run:?}");
        let generated = random_instructions(n, &run, variant);
        if !check_asm_run(&generated, cc)? {
            all_passed = false;
        }
    }

    println!("{}", if all_passed { "Check passed" } else { "Check failed" });
    Ok(())
}

/// Writes `generated` out as an assembly file and invokes `cc -c` on it, the way `random.py`'s
/// `check_asm_run` shells out to a RISC-V compiler. Returns whether the compile succeeded.
fn check_asm_run(generated: &[Instruction], cc: &str) -> Result<bool, RiscvError> {
    let pid = std::process::id();
    let asm_path = std::env::temp_dir().join(format!("riscvmodel-{pid}.S"));
    let obj_path = std::env::temp_dir().join(format!("riscvmodel-{pid}.o"));

    let mut file = fs::File::create(&asm_path)?;
    for insn in generated {
        writeln!(file, "{insn}")?;
    }
    drop(file);

    let status = Command::new(cc).args(["-o", &obj_path.to_string_lossy(), "-c", &asm_path.to_string_lossy()]).status()?;
    let _ = fs::remove_file(&asm_path);
    let _ = fs::remove_file(&obj_path);
    Ok(status.success())
}

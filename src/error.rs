//! Error taxonomy (§7). Each concern gets its own `thiserror` enum; callers that want a
//! single type can convert into [`RiscvError`].

use thiserror::Error;

/// Failure to parse or extend an ISA variant string (§4.1).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VariantError {
    /// The ISA string did not match the `RV(32|64|128)(I|E|G)...` grammar.
    #[error("invalid variant string: {0}")]
    InvalidVariant(String),
    /// An extension named in the ISA string (or its implication closure) is unregistered.
    #[error("unknown extension: {0}")]
    UnknownExtension(String),
    /// `E` base was combined with an `xlen` other than 32.
    #[error("base E requires xlen=32, got {0}")]
    BaseEWrongXlen(u32),
    /// `G` was combined with a base other than `I`.
    #[error("G is only a valid alias for base I")]
    GRequiresBaseI,
}

/// Failure to assign a value to an [`crate::immediate::Immediate`] (§4.2).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ImmediateError {
    /// `value` fell outside `[min, max]` for the immediate's `bits`/`signed` configuration.
    #[error("value {value} not in allowed range {min}..={max} (bits={bits}, signed={signed})")]
    OutOfRange {
        value: i64,
        min: i64,
        max: i64,
        bits: u32,
        signed: bool,
    },
    /// `lsb0` is set and `value` is odd.
    #[error("value {0} is odd but this immediate requires bit 0 clear")]
    NotEven(i64),
}

/// Failure to decode a machine word into an [`crate::instruction::Instruction`] (§4.4).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// No instruction (in the active variant) declares this opcode.
    #[error("invalid instruction: no match for opcode 0b{opcode:07b} in word 0x{word:08x}")]
    InvalidOpcode { word: u32, opcode: u8 },
    /// The opcode matched but no `funct3`/`funct7`/`funct5` combination did.
    #[error("invalid instruction: unrecognized funct bits in word 0x{word:08x}")]
    InvalidFunct { word: u32 },
    /// No 16-bit compressed instruction matched.
    #[error("invalid compressed instruction: 0x{0:04x}")]
    InvalidCompressed(u16),
    /// The instruction decodes in general but needs an extension absent from the variant.
    #[error("instruction requires extension not present in variant: {0}")]
    ExtensionNotEnabled(&'static str),
}

impl DecodeError {
    /// The offending machine word, zero-padded per §7's user-visible formatting rule.
    pub fn offending_word(&self) -> Option<u32> {
        match *self {
            DecodeError::InvalidOpcode { word, .. } | DecodeError::InvalidFunct { word } => Some(word),
            DecodeError::InvalidCompressed(w) => Some(u32::from(w)),
            DecodeError::ExtensionNotEnabled(_) => None,
        }
    }
}

/// Mismatch detected by the golden-model / RVFI bridge (§4.7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GoldenError {
    /// `fetch` was called with a PC other than the one the golden model expected next.
    #[error("unexpected fetch pc: got 0x{got:08x}, expected 0x{expected:08x}")]
    UnexpectedFetchPc { expected: u64, got: u64 },
    /// The retired instruction differs from the one the golden model expected.
    #[error("unexpected retired instruction: got {got}, expected {expected}")]
    UnexpectedInstruction { expected: String, got: String },
    /// The observed trace does not match the model's prediction.
    #[error("unexpected state change: observed [{observed}], expected [{expected}]")]
    StateMismatch { observed: String, expected: String },
    /// An RVFI retire record wrote `rd == 0` with a nonzero value.
    #[error("rd=0 written with nonzero data {0:#x}, which violates the zero-register invariant")]
    ZeroRegisterWritten(u64),
}

/// The golden model ran out of program to fetch or retire against; not a hard failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("golden program exhausted")]
pub struct GoldenProgramEnd;

/// Raised from `ecall`'s environment hook; unwinds [`crate::simulator::Simulator::run`]
/// without being folded into [`RiscvError`] (it is control flow, not a fault).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Terminate {
    pub returncode: i32,
}

impl std::fmt::Display for Terminate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "terminated with code {}", self.returncode)
    }
}
impl std::error::Error for Terminate {}

/// Umbrella error for callers (notably the CLI binary) that don't want to match on the
/// per-concern enums above.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RiscvError {
    #[error(transparent)]
    Variant(#[from] VariantError),
    #[error(transparent)]
    Immediate(#[from] ImmediateError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Golden(#[from] GoldenError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

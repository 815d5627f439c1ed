//! ISA variant parsing and extension implication closure (§4.1).
//!
//! A [`Variant`] names a base integer width, a register-file shape and a closed set of
//! standard/user extensions. Variants form a partial order (`<=`) used by the instruction
//! registry to decide which mnemonics are eligible for a given core.

use std::collections::BTreeSet;
use std::sync::{Mutex, OnceLock};

use crate::error::VariantError;

/// The integer base of a variant: the full 32-register `I` base, or the 16-register
/// embedded `E` base (only legal with `xlen == 32`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base {
    I,
    E,
}

/// A resolved, extension-closed RISC-V ISA profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    name: String,
    xlen: u32,
    base: Base,
    extensions: BTreeSet<String>,
}

fn builtin_implications(ext: &str) -> &'static [&'static str] {
    match ext {
        "D" => &["F"],
        "F" => &["Zicsr"],
        "Q" => &["D", "F"],
        "G" => &["I", "M", "A", "F", "D", "Zicsr", "Zifencei"],
        _ => &[],
    }
}

fn user_extensions() -> &'static Mutex<std::collections::HashMap<String, Vec<String>>> {
    static REGISTRY: OnceLock<Mutex<std::collections::HashMap<String, Vec<String>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(std::collections::HashMap::new()))
}

/// Registers a user extension (prefix `X`) and the extensions it implies, for use in ISA
/// strings parsed afterwards. Built-in extensions cannot be overridden.
pub fn register_extension(name: &str, implies: &[&str]) {
    let mut registry = user_extensions().lock().expect("extension registry poisoned");
    registry.insert(name.to_string(), implies.iter().map(|s| s.to_string()).collect());
}

fn implications_of(ext: &str) -> Vec<String> {
    let builtin = builtin_implications(ext);
    if !builtin.is_empty() {
        return builtin.iter().map(|s| s.to_string()).collect();
    }
    user_extensions()
        .lock()
        .expect("extension registry poisoned")
        .get(ext)
        .cloned()
        .unwrap_or_default()
}

fn close_extensions(seed: impl IntoIterator<Item = String>) -> BTreeSet<String> {
    let mut closed: BTreeSet<String> = BTreeSet::new();
    let mut queue: Vec<String> = seed.into_iter().collect();
    while let Some(ext) = queue.pop() {
        if closed.insert(ext.clone()) {
            queue.extend(implications_of(&ext));
        }
    }
    closed
}

impl Variant {
    /// Constructs a variant directly, closing `extensions` under implication. Prefer
    /// [`Variant::parse`] for ISA strings; this is for programmatic construction (tests,
    /// the `+` combinator).
    pub fn new(xlen: u32, base: Base, extensions: impl IntoIterator<Item = String>) -> Result<Self, VariantError> {
        if base == Base::E && xlen != 32 {
            return Err(VariantError::BaseEWrongXlen(xlen));
        }
        let extensions = close_extensions(extensions);
        let name = format!(
            "RV{}{}{}",
            xlen,
            if base == Base::E { "E" } else { "I" },
            extensions.iter().cloned().collect::<Vec<_>>().join("_")
        );
        Ok(Self { name, xlen, base, extensions })
    }

    /// Parses an ISA string such as `"RV32I"`, `"RV64GC"`, `"RV32IMZicsr"`.
    pub fn parse(name: &str) -> Result<Self, VariantError> {
        let original = name;
        let rest = name.strip_prefix("RV").ok_or_else(|| VariantError::InvalidVariant(original.to_string()))?;
        let xlen_len = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        if xlen_len == 0 {
            return Err(VariantError::InvalidVariant(original.to_string()));
        }
        let (xlen_str, rest) = rest.split_at(xlen_len);
        let xlen: u32 = xlen_str.parse().map_err(|_| VariantError::InvalidVariant(original.to_string()))?;
        if !matches!(xlen, 32 | 64 | 128) {
            return Err(VariantError::InvalidVariant(original.to_string()));
        }

        let mut chars = rest.chars();
        let base_char = chars.next().ok_or_else(|| VariantError::InvalidVariant(original.to_string()))?;
        let mut seed: Vec<String> = Vec::new();
        let base = match base_char {
            'I' => Base::I,
            'E' => {
                if xlen != 32 {
                    return Err(VariantError::BaseEWrongXlen(xlen));
                }
                Base::E
            }
            'G' => {
                seed.push("G".to_string());
                Base::I
            }
            _ => return Err(VariantError::InvalidVariant(original.to_string())),
        };

        let rest: String = chars.collect();
        for token in tokenize_extensions(&rest) {
            seed.push(token);
        }

        let extensions = close_extensions(seed);
        for ext in &extensions {
            if builtin_implications(ext).is_empty()
                && !matches!(ext.as_str(), "I" | "E" | "M" | "A" | "F" | "D" | "Q" | "C" | "G")
                && !ext.starts_with('Z')
                && !ext.starts_with('X')
            {
                return Err(VariantError::UnknownExtension(ext.clone()));
            }
        }

        Ok(Self { name: original.to_string(), xlen, base, extensions })
    }

    pub fn xlen(&self) -> u32 {
        self.xlen
    }

    pub fn base(&self) -> Base {
        self.base
    }

    /// Number of addressable integer registers: 16 for base `E`, 32 otherwise.
    pub fn intregs(&self) -> usize {
        match self.base {
            Base::E => 16,
            Base::I => 32,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_extension(&self, ext: &str) -> bool {
        self.extensions.contains(ext)
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    /// `self <= other` iff both share `xlen`/`base` and `self`'s extensions are a subset
    /// of `other`'s (§4.1, §8 "Variant subset").
    pub fn is_subset_of(&self, other: &Variant) -> bool {
        self.xlen == other.xlen && self.base == other.base && self.extensions.is_subset(&other.extensions)
    }

    /// Returns a new variant with `ext` (and its implications) added.
    pub fn plus(&self, ext: &str) -> Variant {
        let mut extensions = self.extensions.clone();
        extensions.extend(close_extensions([ext.to_string()]));
        Variant { name: format!("{}+{}", self.name, ext), xlen: self.xlen, base: self.base, extensions }
    }

    /// Deterministic human-readable listing for `variant-describe` (§6).
    pub fn describe(&self) -> String {
        let mut out = format!(
            "xlen={} base={:?} intregs={}\nextensions:",
            self.xlen,
            self.base,
            self.intregs()
        );
        if self.extensions.is_empty() {
            out.push_str(" (none)");
        } else {
            for ext in &self.extensions {
                out.push_str("\n  ");
                out.push_str(ext);
            }
        }
        out
    }
}

fn tokenize_extensions(rest: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_' {
            continue;
        }
        if c == 'Z' || c == 'X' {
            let mut tok = String::from(c);
            while let Some(&next) = chars.peek() {
                if next.is_ascii_uppercase() && next != '_' {
                    // a single leading uppercase letter after Z/X starts the extension name;
                    // subsequent lowercase letters belong to it too (e.g. "Zicsr").
                    if tok.len() > 1 && next.is_ascii_uppercase() {
                        break;
                    }
                }
                if next == '_' {
                    break;
                }
                tok.push(next);
                chars.next();
            }
            tokens.push(tok);
        } else if c.is_ascii_uppercase() {
            tokens.push(c.to_string());
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rv32i() {
        let v = Variant::parse("RV32I").unwrap();
        assert_eq!(v.xlen(), 32);
        assert_eq!(v.base(), Base::I);
        assert_eq!(v.intregs(), 32);
    }

    #[test]
    fn parses_rv32e_with_sixteen_registers() {
        let v = Variant::parse("RV32E").unwrap();
        assert_eq!(v.intregs(), 16);
    }

    #[test]
    fn g_expands_to_imafd_zicsr_zifencei() {
        let v = Variant::parse("RV64GC").unwrap();
        for ext in ["I", "M", "A", "F", "D", "Zicsr", "Zifencei", "C"] {
            assert!(v.has_extension(ext), "missing {ext}");
        }
    }

    #[test]
    fn d_implies_f_implies_zicsr() {
        let v = Variant::parse("RV32ID").unwrap();
        assert!(v.has_extension("F"));
        assert!(v.has_extension("Zicsr"));
    }

    #[test]
    fn rejects_e_with_wrong_xlen() {
        assert!(matches!(Variant::parse("RV64E"), Err(VariantError::BaseEWrongXlen(64))));
    }

    #[test]
    fn subset_respects_extensions_only() {
        let a = Variant::parse("RV32I").unwrap();
        let b = Variant::parse("RV32IM").unwrap();
        assert!(a.is_subset_of(&b));
        assert!(!b.is_subset_of(&a));
        assert!(a.is_subset_of(&a));
    }

    #[test]
    fn subset_false_across_xlen() {
        let a = Variant::parse("RV32I").unwrap();
        let b = Variant::parse("RV64I").unwrap();
        assert!(!a.is_subset_of(&b));
    }

    #[test]
    fn user_extension_registers_and_implies() {
        register_extension("Xfoo", &["Zicsr"]);
        let v = Variant::parse("RV32IXfoo").unwrap();
        assert!(v.has_extension("Xfoo"));
        assert!(v.has_extension("Zicsr"));
    }
}

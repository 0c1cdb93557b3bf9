//! Test-only Hack machine: a two-pass symbolic assembler plus a CPU
//! interpreter, just enough to execute the translator's output and inspect
//! RAM afterwards. Not a full emulator: no screen, no keyboard.
#![allow(dead_code)]

use std::collections::HashMap;

use vm2asm::SourceUnit;

/// RAM addresses of the fixed registers.
pub const SP: usize = 0;
pub const LCL: usize = 1;
pub const ARG: usize = 2;
pub const THIS: usize = 3;
pub const THAT: usize = 4;

/// Conventional base values used when running a fragment outside any
/// function frame.
pub const STACK_BASE: i16 = 256;
pub const LCL_BASE: i16 = 300;
pub const ARG_BASE: i16 = 400;
pub const THIS_BASE: i16 = 3000;
pub const THAT_BASE: i16 = 3010;

#[derive(Debug, Clone)]
enum Instr {
    A(i16),
    C {
        dest_a: bool,
        dest_d: bool,
        dest_m: bool,
        comp: String,
        jump: String,
    },
}

pub struct Machine {
    rom: Vec<Instr>,
    symbols: HashMap<String, i16>,
    pub ram: Vec<i16>,
    pub a: i16,
    pub d: i16,
    pub pc: usize,
}

impl Machine {
    /// Assemble Hack assembly text into a ready-to-run machine.
    pub fn load(asm: &str) -> Self {
        let mut symbols = predefined_symbols();

        // Pass 1: strip comments, record label addresses.
        let mut source_instrs: Vec<&str> = Vec::new();
        for raw in asm.lines() {
            let line = raw.split("//").next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if let Some(name) = line.strip_prefix('(') {
                let name = name.trim_end_matches(')');
                symbols.insert(name.to_string(), source_instrs.len() as i16);
            } else {
                source_instrs.push(line);
            }
        }

        // Pass 2: resolve symbols, allocate variables from RAM[16].
        let mut next_var = 16i16;
        let rom = source_instrs
            .iter()
            .map(|line| {
                if let Some(sym) = line.strip_prefix('@') {
                    if let Ok(value) = sym.parse::<i16>() {
                        Instr::A(value)
                    } else {
                        let addr = *symbols.entry(sym.to_string()).or_insert_with(|| {
                            let addr = next_var;
                            next_var += 1;
                            addr
                        });
                        Instr::A(addr)
                    }
                } else {
                    parse_c_instruction(line)
                }
            })
            .collect();

        Self {
            rom,
            symbols,
            ram: vec![0; 32768],
            a: 0,
            d: 0,
            pc: 0,
        }
    }

    /// RAM value of a named variable (e.g. a static slot like `Sys.0`).
    pub fn var(&self, name: &str) -> i16 {
        let addr = self.symbols[name];
        self.ram[addr as usize]
    }

    /// Run until the program falls off the end of ROM, enters the standard
    /// tight halt loop, or the step budget runs out. Returns true if the
    /// machine came to rest within budget.
    pub fn run(&mut self, max_steps: usize) -> bool {
        for _ in 0..max_steps {
            if self.pc >= self.rom.len() {
                return true;
            }
            match self.rom[self.pc].clone() {
                Instr::A(value) => {
                    self.a = value;
                    self.pc += 1;
                }
                Instr::C {
                    dest_a,
                    dest_d,
                    dest_m,
                    comp,
                    jump,
                } => {
                    let addr = (self.a as u16 as usize) & 0x7fff;
                    let value = self.eval(&comp, self.ram[addr]);
                    if dest_m {
                        self.ram[addr] = value;
                    }
                    if dest_a {
                        self.a = value;
                    }
                    if dest_d {
                        self.d = value;
                    }
                    let taken = match jump.as_str() {
                        "" => false,
                        "JGT" => value > 0,
                        "JEQ" => value == 0,
                        "JGE" => value >= 0,
                        "JLT" => value < 0,
                        "JNE" => value != 0,
                        "JLE" => value <= 0,
                        "JMP" => true,
                        other => panic!("bad jump: {other}"),
                    };
                    if taken {
                        let target = self.a as u16 as usize;
                        // `(X) @X 0;JMP` is the halt idiom: jumping back to
                        // the immediately preceding A-instruction.
                        if comp == "0" && jump == "JMP" && target + 1 == self.pc {
                            return true;
                        }
                        self.pc = target;
                    } else {
                        self.pc += 1;
                    }
                }
            }
        }
        false
    }

    fn eval(&self, comp: &str, m: i16) -> i16 {
        let (a, d) = (self.a, self.d);
        match comp {
            "0" => 0,
            "1" => 1,
            "-1" => -1,
            "D" => d,
            "A" => a,
            "M" => m,
            "!D" => !d,
            "!A" => !a,
            "!M" => !m,
            "-D" => d.wrapping_neg(),
            "-A" => a.wrapping_neg(),
            "-M" => m.wrapping_neg(),
            "D+1" => d.wrapping_add(1),
            "A+1" => a.wrapping_add(1),
            "M+1" => m.wrapping_add(1),
            "D-1" => d.wrapping_sub(1),
            "A-1" => a.wrapping_sub(1),
            "M-1" => m.wrapping_sub(1),
            "D+A" => d.wrapping_add(a),
            "D+M" => d.wrapping_add(m),
            "D-A" => d.wrapping_sub(a),
            "D-M" => d.wrapping_sub(m),
            "A-D" => a.wrapping_sub(d),
            "M-D" => m.wrapping_sub(d),
            "D&A" => d & a,
            "D&M" => d & m,
            "D|A" => d | a,
            "D|M" => d | m,
            other => panic!("bad comp: {other}"),
        }
    }

    pub fn sp(&self) -> i16 {
        self.ram[SP]
    }

    /// Top of the operand stack (the value at SP-1).
    pub fn top(&self) -> i16 {
        self.ram[(self.sp() - 1) as usize]
    }
}

fn parse_c_instruction(line: &str) -> Instr {
    let (dest, rest) = match line.split_once('=') {
        Some((dest, rest)) => (dest, rest),
        None => ("", line),
    };
    let (comp, jump) = match rest.split_once(';') {
        Some((comp, jump)) => (comp, jump),
        None => (rest, ""),
    };
    Instr::C {
        dest_a: dest.contains('A'),
        dest_d: dest.contains('D'),
        dest_m: dest.contains('M'),
        comp: comp.to_string(),
        jump: jump.to_string(),
    }
}

fn predefined_symbols() -> HashMap<String, i16> {
    let mut map = HashMap::new();
    for (i, name) in ["SP", "LCL", "ARG", "THIS", "THAT"].iter().enumerate() {
        map.insert(name.to_string(), i as i16);
    }
    for i in 0..16 {
        map.insert(format!("R{i}"), i);
    }
    map.insert("SCREEN".to_string(), 16384);
    map.insert("KBD".to_string(), 24576);
    map
}

/// Translate a full program (with bootstrap) and run it to completion.
pub fn run_program(units: &[(&str, &str)]) -> Machine {
    let units: Vec<SourceUnit> = units
        .iter()
        .map(|(id, text)| SourceUnit::new(*id, *text))
        .collect();
    let asm = vm2asm::translate_program(&units).expect("translation failed");
    let mut machine = Machine::load(&asm);
    assert!(machine.run(2_000_000), "program did not halt within budget");
    machine
}

/// Translate a bare command sequence (no bootstrap) and run it with
/// conventional base registers preloaded.
pub fn run_fragment(vm: &str) -> Machine {
    let asm = vm2asm::translate_source(vm, "Frag").expect("translation failed");
    let mut machine = Machine::load(&asm);
    machine.ram[SP] = STACK_BASE;
    machine.ram[LCL] = LCL_BASE;
    machine.ram[ARG] = ARG_BASE;
    machine.ram[THIS] = THIS_BASE;
    machine.ram[THAT] = THAT_BASE;
    assert!(machine.run(2_000_000), "fragment did not halt within budget");
    machine
}

use std::fmt::Write;

use crate::bytecode::{Bytecode, OpCode};

/// Print disassembly of a bytecode program
pub fn print_bc(bc: &Bytecode) {
    println!("════════════════════════════════════════");
    println!(" main");
    println!(" {} instructions, {} data entries", bc.ops.len(), bc.data.len());
    println!("════════════════════════════════════════");
    print!("{}", disassemble(bc));
}

/// Renders one instruction per line as `ip  MNEMONIC  operand ; effect`.
///
/// `PUSH` operands are resolved from the data table in the order the VM
/// would consume them.
pub fn disassemble(bc: &Bytecode) -> String {
    let mut out = String::new();
    let mut cursor = 0;

    for (ip, op) in bc.ops.iter().enumerate() {
        let _ = write!(out, "{:04}  ", ip);
        let _ = match op {
            OpCode::Push => {
                let operand = match bc.data.get(cursor) {
                    Some(v) => format!("{}", v),
                    None => "<missing>".to_string(),
                };
                cursor += 1;
                writeln!(out, "PUSH        {:<10}; ( -- x )", operand)
            }
            OpCode::Add => writeln!(out, "ADD                   ; ( a b -- a+b )"),
            OpCode::Sub => writeln!(out, "SUB                   ; ( a b -- a-b )"),
            OpCode::Mul => writeln!(out, "MUL                   ; ( a b -- a*b )"),
            OpCode::Div => writeln!(out, "DIV                   ; ( a b -- a/b )"),
            OpCode::Halt => writeln!(out, "HALT"),
        };
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operands_resolved() {
        let mut bc = Bytecode::new();
        bc.push(3.0).push(4.5).op(OpCode::Add).op(OpCode::Halt);
        let text = disassemble(&bc);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("0000  PUSH        3 "));
        assert!(lines[1].starts_with("0001  PUSH        4.5 "));
        assert!(lines[2].starts_with("0002  ADD"));
        assert_eq!(lines[3], "0003  HALT");
    }

    #[test]
    fn test_missing_operand_marked() {
        let bc = Bytecode {
            ops: vec![OpCode::Push],
            data: vec![],
        };
        assert!(disassemble(&bc).contains("<missing>"));
    }
}

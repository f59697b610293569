//! OpenQASM 3.0 rendering of calibration circuits
//!
//! A calibration circuit is X gates on the set bits of its basis index
//! followed by a full measurement, so the rendered program is a header,
//! one `x` instruction per flipped qubit, and a measure-all.

use qrem_core::CalibrationCircuit;

/// QASM program builder
#[derive(Debug)]
pub struct QasmBuilder {
    version: String,
    includes: Vec<String>,
    n_qubits: usize,
    instructions: Vec<String>,
}

impl QasmBuilder {
    pub fn new(n_qubits: usize) -> Self {
        Self {
            version: "OPENQASM 3.0;".to_string(),
            includes: vec!["include \"stdgates.inc\";".to_string()],
            n_qubits,
            instructions: Vec::new(),
        }
    }

    pub fn add_instruction(&mut self, instruction: String) {
        self.instructions.push(instruction);
    }

    /// Build the program with declarations and a trailing measure-all
    pub fn build(self) -> String {
        let mut lines = Vec::new();

        lines.push(self.version);
        lines.push(String::new());

        for inc in self.includes {
            lines.push(inc);
        }
        lines.push(String::new());

        lines.push(format!("qubit[{}] q;", self.n_qubits));
        lines.push(format!("bit[{}] c;", self.n_qubits));
        lines.push(String::new());

        for inst in self.instructions {
            lines.push(inst);
        }

        lines.push(String::new());
        lines.push("c = measure q;".to_string());

        lines.join("\n")
    }
}

/// Render a calibration circuit as an OpenQASM 3.0 program
pub fn render(circuit: &CalibrationCircuit) -> String {
    let mut builder = QasmBuilder::new(circuit.n_qubits());

    for &qubit in circuit.x_gates() {
        builder.add_instruction(format!("x q[{}];", qubit));
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_ground_state_circuit() {
        let circuit = CalibrationCircuit::new(2, 0).unwrap();
        let qasm = render(&circuit);

        assert!(qasm.starts_with("OPENQASM 3.0;"));
        assert!(qasm.contains("include \"stdgates.inc\";"));
        assert!(qasm.contains("qubit[2] q;"));
        assert!(qasm.contains("bit[2] c;"));
        assert!(qasm.contains("c = measure q;"));
        assert!(!qasm.contains("x q["));
    }

    #[test]
    fn test_render_flips_set_bits() {
        // Basis index 5 = 0b101: X on qubits 0 and 2
        let circuit = CalibrationCircuit::new(3, 5).unwrap();
        let qasm = render(&circuit);

        assert!(qasm.contains("x q[0];"));
        assert!(!qasm.contains("x q[1];"));
        assert!(qasm.contains("x q[2];"));
    }

    #[test]
    fn test_render_preparation_precedes_measurement() {
        let circuit = CalibrationCircuit::new(2, 3).unwrap();
        let qasm = render(&circuit);

        let x_pos = qasm.find("x q[0];").unwrap();
        let measure_pos = qasm.find("c = measure q;").unwrap();
        assert!(x_pos < measure_pos);
    }
}

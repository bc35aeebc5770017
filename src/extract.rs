//! Verilog module extraction from free-text model responses.
//!
//! Model responses usually wrap the design in prose or markdown fences.
//! The extractor keeps the inclusive span from the first line carrying a
//! whole-token `module` keyword through the last line carrying a
//! whole-token `endmodule`. Token matching avoids false positives on
//! identifiers that merely contain the keyword (`submodule`, `module_x`).

/// Keyword opening a Verilog module definition.
pub const MODULE_START: &str = "module";

/// Keyword closing a Verilog module definition.
pub const MODULE_END: &str = "endmodule";

/// Extract the Verilog module content from a model response.
///
/// Returns an empty string when no line carries a whole-token `module`
/// keyword. A missing `endmodule` extends the span to the last line, as
/// does a stray `endmodule` that only appears above the `module` line.
pub fn extract_module(response: &str) -> String {
    let lines: Vec<&str> = response.lines().collect();

    let Some(start) = lines.iter().position(|line| has_token(line, MODULE_START)) else {
        return String::new();
    };

    let end = lines
        .iter()
        .rposition(|line| has_token(line, MODULE_END))
        .filter(|&end| end >= start)
        .unwrap_or(lines.len() - 1);

    lines[start..=end].join("\n")
}

fn has_token(line: &str, token: &str) -> bool {
    line.split_whitespace().any(|word| word == token)
}

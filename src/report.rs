use std::io::{self, Write};

use crate::mining::RunReport;

/// Print one line per miner followed by the chain verdict.
pub fn write_report<W: Write>(report: &RunReport, out: &mut W) -> io::Result<()> {
    for (miner, mined) in report.mined_counts() {
        writeln!(out, "Miner {miner} has {mined} bitcoin(s)")?;
    }
    writeln!(
        out,
        "\nThe transaction chain is {}",
        if report.valid { "valid" } else { "invalid" }
    )
}

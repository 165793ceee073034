//! Names of the installer's built-in variables.

/// Names of the variables numbered 20 to 31.
const NAMED_VARIABLES: [&str; 12] = [
    "CMDLINE",
    "INSTDIR",
    "OUTDIR",
    "EXEDIR",
    "LANGUAGE",
    "TEMP",
    "PLUGINSDIR",
    "EXEPATH",
    "EXEFILE",
    "HWNDPARENT",
    "_CLICK",
    "_OUTDIR",
];

/// Renders variable `index` as it appears in a script, with a leading `$`.
///
/// Registers `0..=9` render as bare numbers, `10..=19` as `R0..=R9`,
/// `20..=31` by name, and user variables as `_{n}_`.
pub fn variable_name(index: u32) -> String {
    match index {
        0..=9 => format!("${}", index),
        10..=19 => format!("$R{}", index - 10),
        20..=31 => format!("${}", NAMED_VARIABLES[(index - 20) as usize]),
        _ => format!("$_{}_", index - 32),
    }
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version banner served by `/api/v1/version` and `greendots version`.
///
/// Includes the commit id when the build sets `GREENDOTS_COMMIT`.
pub fn full_version() -> String {
    let mut out = format!("version\t{VERSION}\n");
    if let Some(commit) = option_env!("GREENDOTS_COMMIT") {
        out.push_str(&format!("commit\t{commit}\n"));
    }
    out
}

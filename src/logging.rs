/// Sets up `stderrlog` for a binary and this library.
///
/// `module` is the binary's `module_path!()`. Each `verbose` step raises the
/// level by one, starting from errors only.
pub fn init(module: &str, verbose: u8, quiet: bool) -> Result<(), log::SetLoggerError> {
    stderrlog::StdErrLog::new()
        .verbosity(verbose as usize)
        .quiet(quiet)
        .module(module)
        .module(env!("CARGO_CRATE_NAME"))
        .show_module_names(true)
        .color(stderrlog::ColorChoice::Auto)
        .init()
}

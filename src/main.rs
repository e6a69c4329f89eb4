fn main() {
    #[cfg(feature = "cli")]
    gedcom_codec::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("gedcom-codec: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}

use collagenrs::config::AnalysisConfig;

// Prints the built-in thresholds as a TOML file to start a custom config from.
fn main() {
    print!("{}", AnalysisConfig::default().to_toml());
}

use serde::Serialize;
use skillflow_client::{ResultData, ResultMetadata};

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_outputs(data: &ResultData, metadata: &ResultMetadata) {
    print_section("Analysis", &data.analysis);
    println!();
    print_section("Guide", &data.guide);
    println!("\n---");
    if metadata.run_id.is_empty() {
        println!("Duration: {}ms", metadata.duration_ms);
    } else {
        println!(
            "Run: {}  Duration: {}ms",
            metadata.run_id, metadata.duration_ms
        );
    }
}

fn print_section(heading: &str, body: &str) {
    println!("## {heading}");
    println!();
    if body.is_empty() {
        println!("(empty)");
    } else {
        println!("{}", body.trim_end());
    }
}
